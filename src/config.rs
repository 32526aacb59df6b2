use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

/// Environment-driven client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    /// Publishable key the identity session provider is initialised with.
    pub auth_publishable_key: Option<String>,
    pub token_wait: TokenWaitConfig,
}

/// Tuning for the bounded wait on the identity session. The client polls the
/// provider at `interval` up to `max_attempts` times before giving up.
#[derive(Debug, Clone, Copy)]
pub struct TokenWaitConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for TokenWaitConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_attempts: 20,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let api_url = env::var("PHOTOWALL_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let auth_publishable_key = env::var("PHOTOWALL_AUTH_PUBLISHABLE_KEY").ok();
        let mut token_wait = TokenWaitConfig::default();
        if let Some(ms) = env::var("PHOTOWALL_TOKEN_WAIT_MS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
        {
            token_wait.interval = Duration::from_millis(ms);
        }
        if let Some(attempts) = env::var("PHOTOWALL_TOKEN_WAIT_ATTEMPTS")
            .ok()
            .and_then(|raw| raw.parse::<u32>().ok())
        {
            token_wait.max_attempts = attempts;
        }
        Self {
            api_url,
            auth_publishable_key,
            token_wait,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_publishable_key: None,
            token_wait: TokenWaitConfig::default(),
        }
    }
}
