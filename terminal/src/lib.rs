//! # Swap Terminal
//!
//! Headless command line front end for the swap engine in `lib-swap`:
//! quotes a pair, optionally executes it with an ephemeral local wallet, and
//! prints the session snapshot as text or JSON.

pub mod cli;
pub mod debug;
pub mod render;

pub use cli::Args;
