//! # Utilities Library
//!
//! Shared utility functions for environment variables, token amounts, time and display formatting.

pub mod amount;
pub mod envs;
pub mod format;
pub mod time;

// Re-export commonly used functions
pub use amount::{format_raw_amount, parse_raw_amount};
pub use envs::{get_env, get_env_opt, get_env_parse};
pub use format::{format_address, format_price_impact, shorten_address};
pub use time::{format_age, now_utc};
