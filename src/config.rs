// Runtime configuration.
// All settings are read from the environment once at process start.

use std::env;
use std::time::Duration;

use crate::cache::DEFAULT_TTL;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Base URL of the GitHub REST API (overridable for tests).
    pub api_base: String,
    /// Optional token forwarded as a bearer credential on upstream calls.
    /// Absence only means lower upstream rate limits.
    pub github_token: Option<String>,
    /// Maximum age of a cached response.
    pub cache_ttl: Duration,
    /// Upper bound on a single upstream call.
    pub request_timeout: Duration,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("HUBCACHE_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            api_base: env::var("HUBCACHE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            github_token: env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            cache_ttl: secs_from_env("HUBCACHE_CACHE_TTL_SECS", DEFAULT_TTL),
            request_timeout: secs_from_env("HUBCACHE_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

fn secs_from_env(key: &str, default: Duration) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
