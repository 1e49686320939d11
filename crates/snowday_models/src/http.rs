//! Shared HTTP plumbing.

use reqwest::{Client, Response};
use snowday_error::{ConfigError, HttpError, SnowdayResult};
use std::time::Duration;
use tracing::error;

/// Build a client with a request timeout.
pub(crate) fn build_client(timeout: Duration) -> SnowdayResult<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::new(format!("Failed to build HTTP client: {}", e)))?)
}

/// Convert a transport failure, keeping the status when there is one.
#[track_caller]
pub(crate) fn transport_error(service: &'static str, err: reqwest::Error) -> HttpError {
    error!(service, error = ?err, "HTTP request failed");
    match err.status() {
        Some(status) => HttpError::with_status(status.as_u16(), format!("{} request failed: {}", service, err)),
        None => HttpError::new(format!("{} request failed: {}", service, err)),
    }
}

/// Pass successful responses through; turn the rest into an [`HttpError`]
/// carrying the status and response body.
pub(crate) async fn ensure_success(service: &'static str, response: Response) -> SnowdayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    error!(service, status = %status, error = %body, "API error");
    Err(HttpError::with_status(status.as_u16(), format!("{} API error: {}", service, body)).into())
}
