mod config;
mod errors;
mod guidance;
mod llm_client;
mod market;
mod models;
mod progress;
mod state;
mod taxonomy;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::guidance::pipeline::assess;
use crate::llm_client::{LlmClient, OfflineGenerator, TextGenerator};
use crate::market::catalog::MarketCatalog;
use crate::models::catalog::{CareerPathGraph, LearningResources};
use crate::models::profile::StudentProfile;
use crate::state::AdvisorState;
use crate::taxonomy::SkillTaxonomy;

const DEFAULT_ROLE: &str = "Data Analyst";
const DEFAULT_DURATION_WEEKS: u32 = 12;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Advisor v{}", env!("CARGO_PKG_VERSION"));

    // Load static datasets
    let taxonomy = Arc::new(
        SkillTaxonomy::from_path(&config.dataset_path("skills_taxonomy.json"))
            .context("failed to load skills taxonomy")?,
    );
    let catalog = Arc::new(
        MarketCatalog::from_path(&config.dataset_path("job_market.json"), taxonomy.clone())
            .context("failed to load job market dataset")?,
    );
    let career_paths = Arc::new(
        CareerPathGraph::from_path(&config.dataset_path("career_paths.json"))
            .context("failed to load career paths dataset")?,
    );
    let resources = Arc::new(
        LearningResources::from_path(&config.dataset_path("learning_resources.json"))
            .context("failed to load learning resources dataset")?,
    );
    info!(
        "datasets loaded: {} roles in catalog",
        catalog.roles().len()
    );

    // Select narrator: real client when a key is configured, offline
    // otherwise (every call site falls back to its deterministic template).
    let narrator: Arc<dyn TextGenerator> = match config.anthropic_api_key.clone() {
        Some(key) => {
            info!("narrator: Anthropic client (model: {})", llm_client::MODEL);
            Arc::new(LlmClient::new(key))
        }
        None => {
            info!("narrator: offline (no API key); deterministic templates in use");
            Arc::new(OfflineGenerator)
        }
    };

    let state = AdvisorState {
        catalog,
        career_paths,
        resources,
        narrator,
    };

    // One end-to-end assessment: role from argv, profile from the data dir.
    let desired_role = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ROLE.to_string());
    let profile_raw = std::fs::read_to_string(config.dataset_path("student_profile.json"))
        .context("failed to read student profile")?;
    let profile: StudentProfile =
        serde_json::from_str(&profile_raw).context("failed to parse student profile")?;

    let assessment = assess(&state, &profile, &desired_role, DEFAULT_DURATION_WEEKS).await?;

    println!("{}", serde_json::to_string_pretty(&assessment)?);

    Ok(())
}
