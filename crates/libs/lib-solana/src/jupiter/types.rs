//! # Jupiter API Types
//!
//! Type definitions for Jupiter Aggregator API responses.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Response from Jupiter quote API
///
/// Unknown fields are kept in `extra` so the quote can be posted back to the
/// swap endpoint unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    #[serde(rename = "inputMint")]
    pub input_mint: String,
    #[serde(rename = "outputMint")]
    pub output_mint: String,
    #[serde(rename = "inAmount")]
    pub in_amount: String,
    #[serde(rename = "outAmount")]
    pub out_amount: String,
    /// Price impact as a fraction, e.g. "0.0012"
    #[serde(rename = "priceImpactPct", deserialize_with = "string_or_number")]
    pub price_impact_pct: String,
    #[serde(rename = "routePlan", default)]
    pub route_plan: Vec<RoutePlanStep>,
    #[serde(rename = "slippageBps", default)]
    pub slippage_bps: u16,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuoteResponse {
    /// Output amount in the output token's smallest unit.
    pub fn out_amount_raw(&self) -> anyhow::Result<u64> {
        self.out_amount
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid outAmount '{}': {}", self.out_amount, e))
    }

    /// Price impact as a fraction. Unparsable values count as zero.
    pub fn price_impact_fraction(&self) -> f64 {
        self.price_impact_pct.trim().parse::<f64>().unwrap_or(0.0)
    }

    pub fn hop_count(&self) -> usize {
        self.route_plan.len()
    }
}

/// A step in Jupiter's routing plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlanStep {
    #[serde(rename = "swapInfo")]
    pub swap_info: SwapInfo,
    #[serde(default)]
    pub percent: u8,
}

/// Details about a single swap operation within a route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapInfo {
    #[serde(rename = "ammKey")]
    pub amm_key: String,
    pub label: Option<String>,
    #[serde(rename = "inputMint")]
    pub input_mint: String,
    #[serde(rename = "outputMint")]
    pub output_mint: String,
    #[serde(rename = "inAmount")]
    pub in_amount: String,
    #[serde(rename = "outAmount")]
    pub out_amount: String,
    #[serde(rename = "feeAmount", default)]
    pub fee_amount: String,
    #[serde(rename = "feeMint", default)]
    pub fee_mint: String,
}

/// Response from Jupiter swap API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapTransactionResponse {
    /// Base64-encoded serialized Solana transaction
    #[serde(rename = "swapTransaction")]
    pub swap_transaction: String,
    /// Block height after which transaction is invalid
    #[serde(rename = "lastValidBlockHeight")]
    pub last_valid_block_height: u64,
    /// Optional priority fee in lamports
    #[serde(rename = "prioritizationFeeLamports", default)]
    pub prioritization_fee_lamports: Option<u64>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok("0".to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
