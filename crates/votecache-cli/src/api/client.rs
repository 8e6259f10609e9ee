//! HTTP client for fetching detailed votes.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use votecache_core::{Vote, VoteId, VoteSource};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL of the public API.
pub const DEFAULT_API_BASE_URL: &str = "https://howtheyvote.eu/api";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for HowTheyVote.eu.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("votecache/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn vote_url(&self, id: &VoteId) -> String {
        format!("{}/votes/{}", self.base_url, id)
    }

    /// Check response status for retry logic.
    /// Returns Ok(Some(response)) on success, Ok(None) if rate limited (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url)
                .header(header::ACCEPT, "application/json")
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    /// Fetch a vote with every member's position.
    pub async fn fetch_vote_detail(&self, id: &VoteId) -> Result<Vote> {
        let url = self.vote_url(id);
        let vote: Vote = self
            .get(&url)
            .await
            .with_context(|| format!("Failed to fetch vote {}", id))?;
        debug!(vote_id = %id, members = vote.member_votes.len(), "Fetched vote");
        Ok(vote)
    }
}

impl VoteSource for ApiClient {
    async fn fetch_vote(&self, id: &VoteId) -> Result<Vote> {
        self.fetch_vote_detail(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_url() {
        let client = ApiClient::new("https://example.org/api/").unwrap();
        assert_eq!(
            client.vote_url(&VoteId::from("166051")),
            "https://example.org/api/votes/166051"
        );
    }
}
