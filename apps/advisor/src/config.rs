use std::path::PathBuf;

use anyhow::Result;

/// Application configuration loaded from environment variables. Every
/// variable has a workable default; a missing `ANTHROPIC_API_KEY` selects
/// the offline generator so deterministic fallbacks are exercised.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub anthropic_api_key: Option<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn dataset_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }
}
