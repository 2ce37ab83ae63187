//! # Solana Library
//!
//! Solana integration for the swap engine: token registry, RPC endpoint
//! selection, RPC client, Jupiter quote/swap client and wallet primitives.

// Declare all modules
pub mod client;
pub mod endpoints;
pub mod jupiter;
pub mod tokens;
pub mod wallet;

pub use lib_core::Network;

// Re-export commonly used types from root for convenience
pub use client::{Confirmation, SendOptions, SolanaClient};
pub use endpoints::RpcEndpointSelector;
pub use jupiter::JupiterClient;
pub use tokens::{TokenInfo, TokenPair};
pub use wallet::{ExternalSigner, ExternalWallet, Identity, IdentityKind, WalletError};
