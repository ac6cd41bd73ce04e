// GitHub upstream integration.
// Provides the client and classification types for the GitHub REST API.

pub mod client;
pub mod types;

pub use client::GitHubClient;
pub use types::{RateLimit, ResourceKind, UpstreamOutcome};
