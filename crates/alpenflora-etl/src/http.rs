//! Shared HTTP plumbing for the remote clients.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{EnrichError, EnrichResult};

pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> EnrichResult<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(EnrichError::from)
}

/// Map a non-success status to an [`EnrichError`], keeping 429 distinct.
pub(crate) fn ensure_success(response: Response, source_name: &str) -> EnrichResult<Response> {
    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        return Err(EnrichError::RateLimited {
            source_name: source_name.to_string(),
        });
    }
    response.error_for_status().map_err(|e| EnrichError::Http {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}

pub(crate) async fn parse_json<T: DeserializeOwned>(
    response: Response,
    source_name: &str,
) -> EnrichResult<T> {
    response.json().await.map_err(|e| EnrichError::Parse {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}
