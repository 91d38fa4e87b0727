use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Editor configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub http_timeout: Duration,
    pub export_dir: PathBuf,
    pub default_filename: String,
    pub resume_path: Option<PathBuf>,
    pub preview_path: Option<PathBuf>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base_url: require_env("API_BASE_URL")?,
            http_timeout: Duration::from_secs(
                std::env::var("HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse::<u64>()
                    .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            export_dir: std::env::var("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            default_filename: std::env::var("DEFAULT_FILENAME")
                .unwrap_or_else(|_| "my_resume".to_string()),
            resume_path: optional_env("RESUME_PATH").map(PathBuf::from),
            preview_path: optional_env("PREVIEW_PATH").map(PathBuf::from),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
