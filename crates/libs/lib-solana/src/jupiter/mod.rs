//! # Jupiter Aggregator Client
//!
//! Integration with the Jupiter v6 API for swap quotes and unsigned swap transactions.

// region: --- Modules
pub mod types;
pub mod client;
pub mod quote;
pub mod swap;
// endregion: --- Modules

// region: --- Main Client
use client::JupiterHttpClient;
use std::time::Duration;

pub const DEFAULT_QUOTE_API_BASE: &str = "https://quote-api.jup.ag/v6";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for configuring JupiterClient.
///
/// Allows fluent configuration of client settings before building.
#[derive(Debug, Clone)]
pub struct JupiterClientBuilder {
    timeout: Option<Duration>,
    quote_api_base: Option<String>,
}

impl Default for JupiterClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            quote_api_base: Some(DEFAULT_QUOTE_API_BASE.to_string()),
        }
    }
}

impl JupiterClientBuilder {
    /// Set the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the quote/swap API base URL.
    pub fn quote_api_base(mut self, url: impl Into<String>) -> Self {
        self.quote_api_base = Some(url.into());
        self
    }

    /// Build the JupiterClient with configured settings.
    pub fn build(self) -> anyhow::Result<JupiterClient> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        let quote_api_base = self
            .quote_api_base
            .unwrap_or_else(|| DEFAULT_QUOTE_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(JupiterClient {
            inner: JupiterHttpClient { http, quote_api_base },
        })
    }
}

/// Client for Jupiter Aggregator API
#[derive(Clone)]
pub struct JupiterClient {
    inner: JupiterHttpClient,
}

impl JupiterClient {
    /// Create a new Jupiter API client with default settings.
    pub fn new() -> anyhow::Result<Self> {
        Self::builder().build()
    }

    /// Create a new Jupiter client using a builder for configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use lib_solana::jupiter::JupiterClient;
    ///
    /// let client = JupiterClient::builder()
    ///     .timeout(std::time::Duration::from_secs(30))
    ///     .quote_api_base("https://quote-api.jup.ag/v6")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn builder() -> JupiterClientBuilder {
        JupiterClientBuilder::default()
    }

    pub fn quote_api_base(&self) -> &str {
        &self.inner.quote_api_base
    }

    pub async fn get_swap_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u16,
    ) -> anyhow::Result<types::QuoteResponse> {
        self.inner.get_swap_quote(input_mint, output_mint, amount, slippage_bps).await
    }

    pub async fn get_swap_transaction(
        &self,
        quote_response: &types::QuoteResponse,
        user_public_key: &str,
        wrap_and_unwrap_sol: bool,
    ) -> anyhow::Result<types::SwapTransactionResponse> {
        self.inner
            .get_swap_transaction(quote_response, user_public_key, wrap_and_unwrap_sol)
            .await
    }
}
// endregion: --- Main Client

// Re-export commonly used types
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = JupiterClient::builder()
            .quote_api_base("http://localhost:8080/v6/")
            .build()
            .unwrap();
        assert_eq!(client.quote_api_base(), "http://localhost:8080/v6");
    }

    #[test]
    fn test_default_base() {
        let client = JupiterClient::new().unwrap();
        assert_eq!(client.quote_api_base(), DEFAULT_QUOTE_API_BASE);
    }
}
