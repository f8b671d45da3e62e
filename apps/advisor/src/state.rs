use std::sync::Arc;

use crate::llm_client::TextGenerator;
use crate::market::catalog::MarketCatalog;
use crate::models::catalog::{CareerPathGraph, LearningResources};

/// Shared dependencies injected into the assessment pipeline.
#[derive(Clone)]
pub struct AdvisorState {
    pub catalog: Arc<MarketCatalog>,
    pub career_paths: Arc<CareerPathGraph>,
    pub resources: Arc<LearningResources>,
    /// Narrator behind the `TextGenerator` seam — the real LLM client when
    /// an API key is configured, `OfflineGenerator` otherwise.
    pub narrator: Arc<dyn TextGenerator>,
}
