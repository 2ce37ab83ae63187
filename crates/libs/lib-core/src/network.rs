//! # Solana Networks
//!
//! The clusters the swap engine can target and their display metadata.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Solana network selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    /// Solana mainnet-beta (production network)
    Mainnet,
    /// Solana devnet (test network)
    Devnet,
    /// Solana testnet (validator test network)
    Testnet,
}

impl Network {
    /// All networks in selector order.
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::Devnet, Network::Testnet];

    /// Name shown in the network selector.
    pub fn display_name(&self) -> &'static str {
        match self {
            Network::Mainnet => "Mainnet-Beta",
            Network::Devnet => "Devnet",
            Network::Testnet => "Testnet",
        }
    }

    /// Public cluster endpoint maintained by Solana Labs.
    pub fn cluster_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://api.mainnet-beta.solana.com",
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
        }
    }

    /// Query suffix for explorer links (empty on mainnet).
    pub fn explorer_cluster_param(&self) -> &'static str {
        match self {
            Network::Mainnet => "",
            Network::Devnet => "?cluster=devnet",
            Network::Testnet => "?cluster=testnet",
        }
    }

    /// Whether balances on this network carry real value.
    pub fn is_production(&self) -> bool {
        matches!(self, Network::Mainnet)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "mainnet-beta" => Ok(Network::Mainnet),
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(format!("Unknown Solana network '{}'", other)),
        }
    }
}
