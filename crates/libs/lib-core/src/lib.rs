//! # Core Library
//!
//! Error taxonomy, failure classification, network selection and configuration
//! shared by every swap crate.

pub mod classify;
pub mod config;
pub mod error;
pub mod network;

// Re-export commonly used types
pub use classify::{classify, Failure, FailureOrigin};
pub use config::Config;
pub use error::{ErrorKind, Result, SwapError};
pub use network::Network;
