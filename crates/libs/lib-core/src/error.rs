//! # Swap Error Taxonomy
//!
//! Every failure that reaches swap state is one of the seven kinds below. Raw
//! collaborator failures (quote service, RPC endpoint, wallet) are turned into
//! a [`SwapError`] by [`crate::classify`] before they touch any state, so the
//! display layer always has a kind, a message and a remediation hint.
//!
//! ## Error Categories
//!
//! 1. **Input problems** - never retried, no state transition
//!    - [`Validation`](SwapError::Validation)
//!
//! 2. **Transport problems** - last-known state is kept
//!    - [`RateLimited`](SwapError::RateLimited) → rotate the RPC endpoint
//!    - [`NetworkUnavailable`](SwapError::NetworkUnavailable)
//!
//! 3. **Transaction problems** - the swap execution ends in `Failed`
//!    - [`SimulationFailed`](SwapError::SimulationFailed)
//!    - [`TransactionExpired`](SwapError::TransactionExpired)
//!    - [`OnChainExecution`](SwapError::OnChainExecution)
//!
//! 4. **Everything else**
//!    - [`Unknown`](SwapError::Unknown)
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{ErrorKind, SwapError};
//!
//! let err = SwapError::Validation("Input and output tokens cannot be the same".to_string());
//! assert_eq!(err.kind(), ErrorKind::Validation);
//! assert_eq!(err.message(), "Input and output tokens cannot be the same");
//! ```

use serde::Serialize;
use thiserror::Error;

/// Convenience type alias for `Result<T, SwapError>`.
pub type Result<T> = std::result::Result<T, SwapError>;

/// Discriminant of [`SwapError`], convenient for matching and serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Validation,
    RateLimited,
    NetworkUnavailable,
    SimulationFailed,
    TransactionExpired,
    OnChainExecution,
    Unknown,
}

/// Classified swap failure.
///
/// Each variant carries a human-readable description of what went wrong. The
/// matching remediation text is available through [`SwapError::hint`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapError {
    /// Bad or missing input, or a failed pre-flight check.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The quote service or RPC endpoint refused the request (HTTP 429/403).
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Transport-level failure (connection refused, timeout, DNS, 5xx).
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The RPC endpoint's preflight simulation rejected the transaction.
    #[error("Transaction simulation failed: {0}")]
    SimulationFailed(String),

    /// The blockhash validity window elapsed before confirmation.
    #[error("Transaction expired: {0}")]
    TransactionExpired(String),

    /// The transaction landed but the program returned an error.
    ///
    /// Carries the raw on-chain error payload.
    #[error("Transaction failed on-chain: {0}")]
    OnChainExecution(String),

    /// Anything the classifier did not recognise.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl SwapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SwapError::Validation(_) => ErrorKind::Validation,
            SwapError::RateLimited(_) => ErrorKind::RateLimited,
            SwapError::NetworkUnavailable(_) => ErrorKind::NetworkUnavailable,
            SwapError::SimulationFailed(_) => ErrorKind::SimulationFailed,
            SwapError::TransactionExpired(_) => ErrorKind::TransactionExpired,
            SwapError::OnChainExecution(_) => ErrorKind::OnChainExecution,
            SwapError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// The variant's message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            SwapError::Validation(msg)
            | SwapError::RateLimited(msg)
            | SwapError::NetworkUnavailable(msg)
            | SwapError::SimulationFailed(msg)
            | SwapError::TransactionExpired(msg)
            | SwapError::OnChainExecution(msg)
            | SwapError::Unknown(msg) => msg,
        }
    }

    /// Remediation hint shown next to the error.
    pub fn hint(&self) -> &'static str {
        match self {
            SwapError::Validation(_) => "Check the swap inputs and try again.",
            SwapError::RateLimited(_) => {
                "Rate limit exceeded. Switch to a different RPC endpoint with \"Switch RPC\", or wait a moment and try again."
            }
            SwapError::NetworkUnavailable(_) => "Network connection failed. Check your internet connection.",
            SwapError::SimulationFailed(_) => {
                "Transaction simulation failed. This could be due to:\n\
                 • Insufficient token balance\n\
                 • Network congestion\n\
                 • Invalid swap parameters\n\
                 • A stale quote - refresh the quote and retry"
            }
            SwapError::TransactionExpired(_) => "Transaction expired. Please try again with a fresh quote.",
            SwapError::OnChainExecution(_) => {
                "The swap landed on-chain but the program rejected it. The swap parameters may be invalid; refresh the quote and retry."
            }
            SwapError::Unknown(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Convert amount parsing errors into validation errors.
impl From<lib_utils::amount::Error> for SwapError {
    fn from(err: lib_utils::amount::Error) -> Self {
        SwapError::Validation(err.to_string())
    }
}
