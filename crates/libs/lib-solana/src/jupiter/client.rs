//! # Jupiter HTTP Client
//!
//! Shared HTTP plumbing for the quote and swap endpoints.

use reqwest::{Client, Response};

/// HTTP client wrapper for Jupiter API
#[derive(Clone)]
pub struct JupiterHttpClient {
    pub http: Client,
    pub quote_api_base: String,
}

impl JupiterHttpClient {
    /// Turn a non-success response into an error that carries the HTTP status.
    ///
    /// The `status NNN` form is what failure classification looks for.
    pub(crate) async fn error_for_status(response: Response, what: &str) -> anyhow::Error {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
        anyhow::anyhow!("{} failed with status {}: {}", what, status.as_u16(), body.trim())
    }
}
