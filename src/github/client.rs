// GitHub API HTTP client.
// Builds authenticated requests and classifies upstream responses.

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::repo::RepoId;

use super::types::{RateLimit, ResourceKind, UpstreamOutcome};

const GITHUB_API_VERSION: &str = "2022-11-28";

/// Page size requested from list endpoints.
const PAGE_SIZE: u32 = 50;

/// GitHub API client with optional token authentication.
pub struct GitHubClient {
    http: Client,
    base_url: String,
}

impl GitHubClient {
    /// Create a client from the runtime configuration.
    ///
    /// The token, when configured, is attached to every request as a bearer
    /// credential; without it GitHub simply applies the lower unauthenticated
    /// rate limits.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("hubcache"));

        if let Some(token) = &config.github_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ProxyError::Other(format!("invalid GITHUB_TOKEN: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(ProxyError::Api)?;

        Ok(Self {
            http,
            base_url: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a list or a single item and classify the response.
    ///
    /// Expected upstream conditions (404, exhausted rate limit, any other
    /// non-2xx) come back as [`UpstreamOutcome`] variants; only transport
    /// failures surface as errors. Never retries: rate limits must reach the
    /// caller instead of being absorbed here.
    pub async fn fetch(
        &self,
        kind: ResourceKind,
        repo: &RepoId,
        number: Option<u64>,
    ) -> Result<UpstreamOutcome> {
        let request = match number {
            Some(n) => self.http.get(format!(
                "{}/repos/{}/{}/{}",
                self.base_url,
                repo,
                kind.api_path(),
                n
            )),
            None => self
                .http
                .get(format!("{}/repos/{}/{}", self.base_url, repo, kind.api_path()))
                .query(&[("state", "all".to_string()), ("per_page", PAGE_SIZE.to_string())]),
        };

        let response = request.send().await.map_err(ProxyError::Api)?;
        classify(kind, number, response).await
    }
}

/// Map an upstream HTTP response onto an [`UpstreamOutcome`].
async fn classify(
    kind: ResourceKind,
    number: Option<u64>,
    response: Response,
) -> Result<UpstreamOutcome> {
    let status = response.status();
    let rate_limit = RateLimit::from_headers(response.headers());

    if status.is_success() {
        let mut payload: Value = response.json().await.map_err(ProxyError::Api)?;
        if kind == ResourceKind::Issues && number.is_none() {
            filter_pull_requests(&mut payload);
        }
        return Ok(UpstreamOutcome::Success {
            payload,
            rate_limit_remaining: rate_limit.remaining,
        });
    }

    match status {
        StatusCode::NOT_FOUND => Ok(UpstreamOutcome::NotFound),
        StatusCode::FORBIDDEN if rate_limit.remaining == Some(0) => {
            debug!(reset = ?rate_limit.reset, "upstream rate limit exhausted");
            Ok(UpstreamOutcome::RateLimited {
                reset_at: rate_limit.reset_at(),
            })
        }
        _ => {
            let message = response.text().await.unwrap_or_default();
            Ok(UpstreamOutcome::Other {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// GitHub's issues list mixes in pull requests, marked by a `pull_request`
/// key. Drop those so the issues endpoints only ever return true issues.
fn filter_pull_requests(payload: &mut Value) {
    if let Value::Array(items) = payload {
        items.retain(|item| item.get("pull_request").is_none());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GitHubClient {
        let config = Config {
            bind_addr: "127.0.0.1:0".to_string(),
            api_base: server.uri(),
            github_token: None,
            cache_ttl: Duration::from_secs(60),
            request_timeout: Duration::from_secs(5),
        };
        GitHubClient::new(&config).unwrap()
    }

    fn repo() -> RepoId {
        RepoId::parse("octocat/Hello-World").unwrap()
    }

    #[tokio::test]
    async fn test_success_carries_payload_and_remaining() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/pulls"))
            .and(query_param("state", "all"))
            .and(query_param("per_page", "50"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"number": 7}]))
                    .insert_header("x-ratelimit-remaining", "42"),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server)
            .fetch(ResourceKind::PullRequests, &repo(), None)
            .await
            .unwrap();

        match outcome {
            UpstreamOutcome::Success {
                payload,
                rate_limit_remaining,
            } => {
                assert_eq!(payload, json!([{"number": 7}]));
                assert_eq!(rate_limit_remaining, Some(42));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_item_endpoint_addresses_number() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/issues/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"number": 5})))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client_for(&server)
            .fetch(ResourceKind::Issues, &repo(), Some(5))
            .await
            .unwrap();
        assert!(matches!(outcome, UpstreamOutcome::Success { .. }));
    }

    #[tokio::test]
    async fn test_issues_list_filters_pull_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"number": 1, "title": "a real issue"},
                {"number": 2, "title": "a PR", "pull_request": {"url": "..."}}
            ])))
            .mount(&server)
            .await;

        let outcome = client_for(&server)
            .fetch(ResourceKind::Issues, &repo(), None)
            .await
            .unwrap();

        match outcome {
            UpstreamOutcome::Success { payload, .. } => {
                assert_eq!(payload, json!([{"number": 1, "title": "a real issue"}]));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/issues"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        let outcome = client_for(&server)
            .fetch(ResourceKind::Issues, &repo(), None)
            .await
            .unwrap();
        assert!(matches!(outcome, UpstreamOutcome::NotFound));
    }

    #[tokio::test]
    async fn test_403_with_zero_remaining_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/issues"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-remaining", "0")
                    .insert_header("x-ratelimit-reset", "1700000000"),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server)
            .fetch(ResourceKind::Issues, &repo(), None)
            .await
            .unwrap();

        match outcome {
            UpstreamOutcome::RateLimited { reset_at } => {
                assert_eq!(reset_at, chrono::DateTime::from_timestamp(1_700_000_000, 0));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_403_with_remaining_quota_is_other() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/issues"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-remaining", "55")
                    .set_body_string("forbidden for other reasons"),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server)
            .fetch(ResourceKind::Issues, &repo(), None)
            .await
            .unwrap();

        match outcome {
            UpstreamOutcome::Other { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "forbidden for other reasons");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_list_is_a_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/pulls"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let outcome = client_for(&server)
            .fetch(ResourceKind::PullRequests, &repo(), None)
            .await
            .unwrap();
        match outcome {
            UpstreamOutcome::Success { payload, .. } => assert_eq!(payload, json!([])),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
