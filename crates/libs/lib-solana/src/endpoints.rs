//! # RPC Endpoint Selector
//!
//! Ordered candidate RPC endpoints per network with manual round-robin rotation.
//!
//! Rotation is only ever triggered by the user (e.g. after a rate-limit error);
//! there is no health tracking and no automatic failover.

use crate::Network;
use lib_core::config::Config;
use std::collections::HashMap;
use thiserror::Error;

const MAINNET_ENDPOINTS: &[&str] = &[
    "https://api.mainnet-beta.solana.com",
    "https://solana-api.projectserum.com",
    "https://rpc.helius.xyz/?api-key=demo",
    "https://mainnet.helius-rpc.com/?api-key=demo",
];
const DEVNET_ENDPOINTS: &[&str] = &["https://api.devnet.solana.com"];
const TESTNET_ENDPOINTS: &[&str] = &["https://api.testnet.solana.com"];

/// Built-in endpoint list for `network`.
pub fn default_endpoints(network: Network) -> Vec<String> {
    let list = match network {
        Network::Mainnet => MAINNET_ENDPOINTS,
        Network::Devnet => DEVNET_ENDPOINTS,
        Network::Testnet => TESTNET_ENDPOINTS,
    };
    list.iter().map(|s| s.to_string()).collect()
}

/// Keyed Helius mainnet endpoint.
pub fn helius_endpoint(api_key: &str) -> String {
    format!("https://mainnet.helius-rpc.com/?api-key={}", api_key)
}

/// Short provider label for an endpoint URL.
pub fn label(url: &str) -> &'static str {
    let url = url.to_ascii_lowercase();
    if url.contains("helius") {
        "Helius"
    } else if url.contains("projectserum") {
        "Project Serum"
    } else if url.contains("api.mainnet-beta.solana.com")
        || url.contains("api.devnet.solana.com")
        || url.contains("api.testnet.solana.com")
    {
        "Solana Labs"
    } else {
        "Custom"
    }
}

/// Per-network endpoint lists with a current network and rotation index.
#[derive(Debug, Clone)]
pub struct RpcEndpointSelector {
    endpoints: HashMap<Network, Vec<String>>,
    network: Network,
    index: usize,
}

impl RpcEndpointSelector {
    /// Create a selector from explicit per-network lists.
    ///
    /// Every network must have at least one endpoint.
    pub fn new(network: Network, endpoints: HashMap<Network, Vec<String>>) -> Result<Self, Error> {
        for net in Network::ALL {
            if endpoints.get(&net).map_or(true, Vec::is_empty) {
                return Err(Error::NoEndpoints(net));
            }
        }
        Ok(Self {
            endpoints,
            network,
            index: 0,
        })
    }

    /// Built-in lists, optionally prefixed with a keyed Helius mainnet endpoint.
    pub fn with_defaults(network: Network, helius_api_key: Option<&str>) -> Result<Self, Error> {
        let mut endpoints: HashMap<Network, Vec<String>> = Network::ALL
            .iter()
            .map(|net| (*net, default_endpoints(*net)))
            .collect();

        if let Some(key) = helius_api_key {
            if let Some(list) = endpoints.get_mut(&Network::Mainnet) {
                list.insert(0, helius_endpoint(key));
            }
        }

        Self::new(network, endpoints)
    }

    /// Selector honoring the configured network, overrides and Helius key.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let mut endpoints = HashMap::new();
        for net in Network::ALL {
            let mut list = match config.endpoint_override(net) {
                Some(list) => list.to_vec(),
                None => default_endpoints(net),
            };
            if net == Network::Mainnet {
                if let Some(key) = &config.helius_api_key {
                    list.insert(0, helius_endpoint(key));
                }
            }
            endpoints.insert(net, list);
        }
        Self::new(config.network, endpoints)
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Candidate endpoints for `network`.
    pub fn endpoints(&self, network: Network) -> &[String] {
        self.endpoints.get(&network).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Current endpoint for `network` at the current rotation index.
    pub fn current_endpoint(&self, network: Network) -> &str {
        let list = self.endpoints(network);
        if list.is_empty() {
            // Unreachable through `new`, which rejects empty lists.
            return network.cluster_url();
        }
        &list[self.index % list.len()]
    }

    /// Current endpoint for the selected network.
    pub fn current(&self) -> &str {
        self.current_endpoint(self.network)
    }

    /// Rotate to the next endpoint, wrapping at the end of the list.
    ///
    /// Returns the new current endpoint.
    pub fn advance(&mut self) -> &str {
        let len = self.endpoints(self.network).len().max(1);
        self.index = (self.index + 1) % len;
        self.current()
    }

    /// Switch network and restart rotation from the first endpoint.
    pub fn set_network(&mut self, network: Network) -> &str {
        self.network = network;
        self.index = 0;
        self.current()
    }

    /// Label of the current endpoint.
    pub fn current_label(&self) -> &'static str {
        label(self.current())
    }
}

// region:    --- Error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("no RPC endpoints configured for {0}")]
    NoEndpoints(Network),
}
// endregion: --- Error
