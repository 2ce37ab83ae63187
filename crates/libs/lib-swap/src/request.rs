//! # Swap Request
//!
//! The user's input for one quote: token pair plus the decimal amount as typed.

use lib_core::SwapError;
use lib_solana::tokens::TokenInfo;
use lib_utils::amount::{self, parse_raw_amount};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapRequest {
    pub input: &'static TokenInfo,
    pub output: &'static TokenInfo,
    /// Decimal amount of `input` exactly as entered, e.g. "1.5".
    pub amount: String,
}

impl SwapRequest {
    pub fn new(input: &'static TokenInfo, output: &'static TokenInfo, amount: impl Into<String>) -> Self {
        Self {
            input,
            output,
            amount: amount.into(),
        }
    }

    pub fn is_same_token(&self) -> bool {
        self.input.mint == self.output.mint
    }

    /// Input amount in the input token's smallest unit.
    pub fn raw_amount(&self) -> Result<u64, amount::Error> {
        parse_raw_amount(&self.amount, self.input.decimals)
    }

    /// Check the request invariants and return the raw input amount.
    pub fn validate(&self) -> Result<u64, SwapError> {
        let raw = self.raw_amount()?;
        if self.is_same_token() {
            return Err(SwapError::Validation(
                "Input and output tokens cannot be the same".to_string(),
            ));
        }
        Ok(raw)
    }
}
