use std::env;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub mso_url: String,
    pub mso_token: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            mso_url: get_env("MSO_URL", "https://127.0.0.1"),
            mso_token: get_env("MSO_TOKEN", ""),
            timeout_secs: get_env("MSO_TIMEOUT_SECS", "30").parse().unwrap_or(30),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
