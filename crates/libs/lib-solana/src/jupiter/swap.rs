//! # Jupiter Swap Transaction Building
//!
//! Swap transaction building from Jupiter quotes.

use super::client::JupiterHttpClient;
use super::types::{QuoteResponse, SwapTransactionResponse};
use anyhow::Context;
use tracing::{debug, instrument};

impl JupiterHttpClient {
    /// Build an unsigned swap transaction from a quote
    #[instrument(skip(self, quote_response), level = "debug")]
    pub async fn get_swap_transaction(
        &self,
        quote_response: &QuoteResponse,
        user_public_key: &str,
        wrap_and_unwrap_sol: bool,
    ) -> anyhow::Result<SwapTransactionResponse> {
        let url = format!("{}/swap", self.quote_api_base);

        let request_body = serde_json::json!({
            "quoteResponse": quote_response,
            "userPublicKey": user_public_key,
            "wrapAndUnwrapSol": wrap_and_unwrap_sol,
        });

        let response = self
            .http
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .context("Jupiter swap transaction request failed")?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response, "Jupiter swap transaction").await);
        }

        let swap_response: SwapTransactionResponse = response
            .json()
            .await
            .context("Jupiter swap transaction parse failed")?;

        debug!(
            "Jupiter swap transaction received ({} base64 chars)",
            swap_response.swap_transaction.len()
        );

        Ok(swap_response)
    }
}
