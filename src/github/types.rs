// Upstream classification types.
// Defines the resource kinds the proxy serves and the outcome of one fetch.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde_json::Value;

/// Which GitHub collection a request addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Issues,
    PullRequests,
}

impl ResourceKind {
    /// Path segment used in GitHub REST endpoint URLs.
    pub fn api_path(&self) -> &'static str {
        match self {
            ResourceKind::Issues => "issues",
            ResourceKind::PullRequests => "pulls",
        }
    }

    /// Short label used in cache keys and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Issues => "issues",
            ResourceKind::PullRequests => "pr",
        }
    }

    /// Human-readable noun for a single item of this kind.
    pub fn noun(&self) -> &'static str {
        match self {
            ResourceKind::Issues => "issue",
            ResourceKind::PullRequests => "pull request",
        }
    }
}

/// Classified result of a single upstream call.
///
/// Produced once per fetch and never persisted; only `Success` payloads make
/// it into the cache.
#[derive(Debug, Clone)]
pub enum UpstreamOutcome {
    /// 2xx response with the parsed JSON payload.
    Success {
        payload: Value,
        rate_limit_remaining: Option<u64>,
    },
    /// 404: the repository or item does not exist upstream.
    NotFound,
    /// 403 with an exhausted rate-limit quota.
    RateLimited { reset_at: Option<DateTime<Utc>> },
    /// Any other non-2xx status.
    Other { status: u16, message: String },
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateLimit {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    pub reset: Option<u64>,
}

impl RateLimit {
    /// Parse the `x-ratelimit-*` headers; missing or unparseable headers
    /// leave the field unset.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit: header_u64(headers, "x-ratelimit-limit"),
            remaining: header_u64(headers, "x-ratelimit-remaining"),
            reset: header_u64(headers, "x-ratelimit-reset"),
        }
    }

    /// The reset header (epoch seconds) as a timestamp, when present and sane.
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        self.reset
            .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
