//! # Jupiter Quote API
//!
//! Quote API integration for getting swap quotes from Jupiter.

use super::client::JupiterHttpClient;
use super::types::QuoteResponse;
use anyhow::Context;
use tracing::{debug, instrument};

impl JupiterHttpClient {
    /// Get a swap quote from Jupiter Aggregator V6
    #[instrument(skip(self), level = "debug")]
    pub async fn get_swap_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u16,
    ) -> anyhow::Result<QuoteResponse> {
        let url = format!("{}/quote", self.quote_api_base);
        let amount = amount.to_string();
        let slippage = slippage_bps.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("inputMint", input_mint),
                ("outputMint", output_mint),
                ("amount", amount.as_str()),
                ("slippageBps", slippage.as_str()),
            ])
            .send()
            .await
            .context("Jupiter quote request failed")?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response, "Jupiter quote").await);
        }

        let quote: QuoteResponse = response
            .json()
            .await
            .context("Jupiter quote parse failed")?;

        debug!(
            "Jupiter quote: {} -> {} (impact: {}, hops: {})",
            quote.in_amount,
            quote.out_amount,
            quote.price_impact_pct,
            quote.route_plan.len()
        );

        Ok(quote)
    }
}
