use std::env;
use std::time::Duration;

// Local-network backend for development. Point PITCHSIDE_API_URL at the
// hosted instance for production builds.
const DEV_API_URL: &str = "http://192.168.1.72:3000/api";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub request_timeout: Duration,
    /// How long a cached read stays fresh. Referee screens bypass this via
    /// their own poll interval.
    pub stale_window: Duration,
    /// Entries untouched for this long are eligible for eviction.
    pub cache_evict_after: Duration,
    pub referee_poll_interval: Duration,
    pub retry_once: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEV_API_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            stale_window: Duration::from_secs(60 * 60 * 24),
            cache_evict_after: Duration::from_secs(60 * 60 * 48),
            referee_poll_interval: Duration::from_secs(5),
            retry_once: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Some(url) = opt_env("PITCHSIDE_API_URL") {
            config.base_url = url;
        }
        config.request_timeout = secs_env("PITCHSIDE_TIMEOUT_SECS", 10, 1, 120);
        config.stale_window = secs_env("PITCHSIDE_STALE_SECS", 60 * 60 * 24, 5, 60 * 60 * 24 * 7);
        config.cache_evict_after =
            secs_env("PITCHSIDE_EVICT_SECS", 60 * 60 * 48, 60, 60 * 60 * 24 * 14);
        config.referee_poll_interval = secs_env("PITCHSIDE_REFEREE_POLL_SECS", 5, 2, 600);
        config
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|val| {
        let trimmed = val.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn secs_env(key: &str, default: u64, min: u64, max: u64) -> Duration {
    let secs = env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
        .clamp(min, max);
    Duration::from_secs(secs)
}
