use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_AI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_AI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub ai: AiConfig,
    pub roster_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        Config::from_lookup(|k| std::env::var(k).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't touch the
    /// process environment.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = non_empty("SISD_AI_API_KEY").or_else(|| non_empty("API_KEY"));
        let model = non_empty("SISD_AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string());
        let endpoint = non_empty("SISD_AI_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_AI_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeout_secs = match non_empty("SISD_AI_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .with_context(|| format!("SISD_AI_TIMEOUT_SECS must be an integer, got {v:?}"))?,
            None => DEFAULT_AI_TIMEOUT_SECS,
        };

        Ok(Config {
            ai: AiConfig {
                api_key,
                model,
                endpoint,
                timeout: Duration::from_secs(timeout_secs),
            },
            roster_path: non_empty("SISD_ROSTER_PATH").map(PathBuf::from),
        })
    }
}
