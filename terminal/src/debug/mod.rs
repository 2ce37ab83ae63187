//! # Logging
//!
//! Environment driven tracing setup for the binary.

pub mod config;
pub mod logger;

pub use config::LogConfig;
