use std::time::Duration;

/// Runtime configuration for the core, loaded from the environment.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Base URL of the backend API
    pub api_base: String,
    /// Per-request timeout. A request that exceeds it rejects like any other
    /// resource failure, so no loading flag can be left permanently raised.
    pub request_timeout: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_millis(30_000),
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_base = std::env::var("STORYDESK_API_BASE")
            .unwrap_or_else(|_| Self::default().api_base)
            .trim_end_matches('/')
            .to_string();
        let timeout_ms: u64 = env_parse("STORYDESK_REQUEST_TIMEOUT_MS", 30_000)?;

        Ok(Self {
            api_base,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {key} '{value}': {e}")),
        Err(_) => Ok(default),
    }
}
