// Axum router and request handlers.
// Each request runs validate -> cache lookup -> upstream fetch -> respond.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::cache::{CacheKey, ResponseCache};
use crate::error::ProxyError;
use crate::github::{GitHubClient, ResourceKind, UpstreamOutcome};
use crate::repo::RepoId;

/// Shared state handed to every request handler.
///
/// Constructed once at startup; the cache lives for the process lifetime and
/// needs no teardown.
pub struct AppState {
    pub client: GitHubClient,
    pub cache: ResponseCache,
}

/// Build the axum [`Router`] with all routes and shared state.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/issues", get(list_issues))
        .route("/api/issues/{number}", get(get_issue))
        .route("/api/prs", get(list_pulls))
        .route("/api/prs/{number}", get(get_pull))
        .route("/healthz", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RepoQuery {
    repo: Option<String>,
}

/// `GET /api/issues?repo=owner/name`
async fn list_issues(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RepoQuery>,
) -> Result<Response, ProxyError> {
    let repo = parse_repo(query)?;
    respond(state, ResourceKind::Issues, repo, None).await
}

/// `GET /api/issues/:number?repo=owner/name`
async fn get_issue(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
    Query(query): Query<RepoQuery>,
) -> Result<Response, ProxyError> {
    let repo = parse_repo(query)?;
    let number = parse_number(&number)?;
    respond(state, ResourceKind::Issues, repo, Some(number)).await
}

/// `GET /api/prs?repo=owner/name`
async fn list_pulls(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RepoQuery>,
) -> Result<Response, ProxyError> {
    let repo = parse_repo(query)?;
    respond(state, ResourceKind::PullRequests, repo, None).await
}

/// `GET /api/prs/:number?repo=owner/name`
async fn get_pull(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
    Query(query): Query<RepoQuery>,
) -> Result<Response, ProxyError> {
    let repo = parse_repo(query)?;
    let number = parse_number(&number)?;
    respond(state, ResourceKind::PullRequests, repo, Some(number)).await
}

/// `GET /healthz`
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Extract and validate the `repo` query parameter.
fn parse_repo(query: RepoQuery) -> Result<RepoId, ProxyError> {
    let raw = query
        .repo
        .ok_or_else(|| ProxyError::MalformedRepo("missing `repo` query parameter".to_string()))?;
    RepoId::parse(&raw)
}

/// Item numbers must be positive integers.
fn parse_number(raw: &str) -> Result<u64, ProxyError> {
    match raw.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ProxyError::InvalidNumber(format!(
            "{raw:?} is not a positive integer"
        ))),
    }
}

/// Common cache-then-fetch pipeline behind all four API routes.
async fn respond(
    state: Arc<AppState>,
    kind: ResourceKind,
    repo: RepoId,
    number: Option<u64>,
) -> Result<Response, ProxyError> {
    let key = CacheKey::new(kind, repo.clone(), number);

    if let Some(payload) = state.cache.get(&key) {
        debug!(key = %key, "cache hit");
        return Ok(Json(payload).into_response());
    }

    // The fetch runs on a detached task: a client disconnect drops this
    // handler future, but must not cancel an upstream call that is already
    // billed against the rate-limit quota, nor lose its cacheable result.
    let outcome = {
        let state = Arc::clone(&state);
        let repo = repo.clone();
        let key = key.clone();
        tokio::spawn(async move {
            let outcome = state.client.fetch(kind, &repo, number).await;
            if let Ok(UpstreamOutcome::Success { payload, .. }) = &outcome {
                state.cache.put(key, payload.clone());
            }
            outcome
        })
        .await
        .map_err(|e| ProxyError::Other(format!("upstream fetch task failed: {e}")))??
    };

    match outcome {
        UpstreamOutcome::Success {
            payload,
            rate_limit_remaining,
        } => {
            debug!(key = %key, remaining = ?rate_limit_remaining, "stored fresh upstream response");
            Ok(Json(payload).into_response())
        }
        UpstreamOutcome::NotFound => Err(ProxyError::NotFound(describe(kind, &repo, number))),
        UpstreamOutcome::RateLimited { reset_at } => Err(ProxyError::RateLimited { reset_at }),
        UpstreamOutcome::Other { status, message } => {
            Err(ProxyError::Upstream { status, message })
        }
    }
}

fn describe(kind: ResourceKind, repo: &RepoId, number: Option<u64>) -> String {
    match number {
        Some(n) => format!("{} #{n} in {repo}", kind.noun()),
        None => format!("repository {repo}"),
    }
}
