use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_SECRET_KEY: &str = "dev-secret-key";

/// Application configuration loaded from environment variables.
/// Read once at startup and handed to constructors; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub dashscope_api_key: String,
    pub dashscope_base_url: String,
    pub dashscope_model: String,
    pub llm_timeout_secs: u64,
    pub secret_key: String,
    pub session_ttl_hours: i64,
    pub reference_data_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://essay_coach.db?mode=rwc".to_string()),
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
            dashscope_api_key: require_env("DASHSCOPE_API_KEY")?,
            dashscope_base_url: std::env::var("DASHSCOPE_BASE_URL")
                .unwrap_or_else(|_| "https://dashscope.aliyuncs.com".to_string()),
            dashscope_model: std::env::var("DASHSCOPE_MODEL")
                .unwrap_or_else(|_| "qwen-plus".to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            secret_key: std::env::var("SECRET_KEY")
                .unwrap_or_else(|_| DEFAULT_SECRET_KEY.to_string()),
            session_ttl_hours: parse_env("SESSION_TTL_HOURS", 168)?,
            reference_data_dir: std::env::var("REFERENCE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            port: parse_env("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// True when SECRET_KEY was not set and sessions are signed with the development key.
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
