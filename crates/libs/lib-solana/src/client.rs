//! # Solana RPC Client
//!
//! High-level wrapper around the nonblocking Solana RPC client, bound to one
//! endpoint URL.
//!
//! ## Features
//!
//! - **Balance Queries**: native balance in lamports
//! - **Blockhash**: latest blockhash plus its last valid block height
//! - **Raw Submission**: base64 wire transactions with preflight simulation
//! - **Confirmation**: polling bounded by the blockhash validity window
//! - **Health Checks**: verify RPC endpoint connectivity
//!
//! ## Example
//!
//! ```rust,no_run
//! use lib_solana::client::SolanaClient;
//! use solana_sdk::pubkey::Pubkey;
//! use std::str::FromStr;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = SolanaClient::builder()
//!     .rpc_url("https://api.devnet.solana.com")
//!     .build();
//!
//! let pubkey = Pubkey::from_str("So11111111111111111111111111111111111111112")?;
//! let lamports = client.get_balance(&pubkey).await?;
//! println!("Balance: {} lamports", lamports);
//! # Ok(())
//! # }
//! ```

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::RpcRequest;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::Network;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Submission options for [`SolanaClient::send_raw_transaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    pub skip_preflight: bool,
    /// Transport-level rebroadcast attempts requested from the RPC node.
    pub max_retries: usize,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            skip_preflight: false,
            max_retries: 2,
        }
    }
}

/// Result of waiting for a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Landed without error at `confirmed` commitment.
    Success,
    /// Landed, but the program returned an error.
    Failed(String),
}

/// High-level Solana RPC client wrapper.
///
/// The connection is lazy; requests only happen when methods are called.
#[derive(Clone)]
pub struct SolanaClient {
    rpc: Arc<RpcClient>,
    url: String,
    poll_interval: Duration,
}

/// Builder for configuring SolanaClient.
///
/// Allows fluent configuration of client settings before building.
#[derive(Debug, Clone)]
pub struct SolanaClientBuilder {
    network: Option<Network>,
    rpc_url: Option<String>,
    poll_interval: Option<Duration>,
}

impl Default for SolanaClientBuilder {
    fn default() -> Self {
        Self {
            network: Some(Network::Devnet),
            rpc_url: None,
            poll_interval: Some(DEFAULT_POLL_INTERVAL),
        }
    }
}

impl SolanaClientBuilder {
    /// Set the Solana network (used when no explicit URL is given).
    pub fn network(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }

    /// Set the RPC URL (overrides network-based URL).
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    /// Set the signature status polling interval used during confirmation.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Build the SolanaClient with configured settings.
    pub fn build(self) -> SolanaClient {
        let network = self.network.unwrap_or(Network::Devnet);
        let url = self
            .rpc_url
            .unwrap_or_else(|| network.cluster_url().to_string());

        info!("Connecting to Solana RPC: {}", url);

        SolanaClient {
            rpc: Arc::new(RpcClient::new_with_commitment(
                url.clone(),
                CommitmentConfig::confirmed(),
            )),
            url,
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
        }
    }
}

impl SolanaClient {
    /// Create a new Solana RPC client using a builder for configuration.
    pub fn builder() -> SolanaClientBuilder {
        SolanaClientBuilder::default()
    }

    /// Create a client bound to `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self::builder().rpc_url(url).build()
    }

    /// Endpoint URL this client talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Native balance of `pubkey` in lamports.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_balance(&self, pubkey: &Pubkey) -> anyhow::Result<u64> {
        self.rpc
            .get_balance(pubkey)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get balance: {}", e))
    }

    /// Latest blockhash and the last block height at which it is valid.
    pub async fn get_latest_blockhash(&self) -> anyhow::Result<(Hash, u64)> {
        self.rpc
            .get_latest_blockhash_with_commitment(CommitmentConfig::confirmed())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get latest blockhash: {}", e))
    }

    /// Submit a signed, serialized transaction.
    ///
    /// Preflight runs at `processed` commitment unless skipped. Returns the
    /// signature reported by the node.
    #[instrument(skip(self, wire_transaction), fields(bytes = wire_transaction.len()), level = "debug")]
    pub async fn send_raw_transaction(
        &self,
        wire_transaction: &[u8],
        options: SendOptions,
    ) -> anyhow::Result<String> {
        let encoded = BASE64.encode(wire_transaction);
        let params = serde_json::json!([
            encoded,
            {
                "encoding": "base64",
                "skipPreflight": options.skip_preflight,
                "preflightCommitment": "processed",
                "maxRetries": options.max_retries,
            }
        ]);

        let signature: String = self
            .rpc
            .send(RpcRequest::SendTransaction, params)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send transaction: {}", e))?;

        debug!(signature = %signature, "transaction submitted");
        Ok(signature)
    }

    /// Wait until `signature` reaches `confirmed` commitment or the blockhash expires.
    ///
    /// There is no client-side timeout: the wait ends when the chain passes
    /// `last_valid_block_height`, which is reported as an expiry error.
    #[instrument(skip(self), level = "debug")]
    pub async fn confirm_transaction(
        &self,
        signature: &str,
        last_valid_block_height: u64,
    ) -> anyhow::Result<Confirmation> {
        let sig = Signature::from_str(signature)
            .with_context(|| format!("Invalid signature '{}'", signature))?;

        loop {
            let status = self
                .rpc
                .get_signature_status_with_commitment(&sig, CommitmentConfig::confirmed())
                .await
                .map_err(|e| anyhow::anyhow!("Failed to get signature status: {}", e))?;

            match status {
                Some(Ok(())) => return Ok(Confirmation::Success),
                Some(Err(err)) => return Ok(Confirmation::Failed(format!("{:?}", err))),
                None => {}
            }

            let block_height = self
                .rpc
                .get_block_height()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to get block height: {}", e))?;

            if block_height > last_valid_block_height {
                return Err(anyhow::anyhow!(
                    "Signature {} has expired: block height exceeded ({} > {})",
                    signature,
                    block_height,
                    last_valid_block_height
                ));
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
