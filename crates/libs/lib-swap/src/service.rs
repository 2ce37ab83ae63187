//! # Collaborator Traits
//!
//! Seams between the swap engine and the outside world, enabling fakes in tests.
//!
//! Every method reports failures as an unclassified [`Failure`]; the engine
//! classifies them before they touch any state.

use async_trait::async_trait;
use lib_core::{Failure, FailureOrigin};
use lib_solana::client::{Confirmation, SendOptions, SolanaClient};
use lib_solana::jupiter::{JupiterClient, QuoteResponse};
use solana_sdk::{hash::Hash, pubkey::Pubkey};
use std::sync::Arc;
use std::time::Duration;

/// Blockhash plus the last block height at which it is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockhashInfo {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// Swap quoting and transaction building service.
#[async_trait]
pub trait QuoteApi: Send + Sync {
    async fn get_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<QuoteResponse, Failure>;

    /// Build an unsigned swap transaction; returns it base64 encoded.
    async fn build_swap_transaction(
        &self,
        quote: &QuoteResponse,
        user_public_key: &str,
        wrap_and_unwrap_sol: bool,
    ) -> Result<String, Failure>;
}

/// RPC endpoint operations used by the engine.
#[async_trait]
pub trait RpcApi: Send + Sync {
    fn url(&self) -> &str;

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, Failure>;

    async fn get_latest_blockhash(&self) -> Result<BlockhashInfo, Failure>;

    async fn send_raw_transaction(&self, wire_transaction: &[u8], options: SendOptions) -> Result<String, Failure>;

    /// Wait for `signature`, bounded by the validity window of `blockhash`.
    async fn confirm_transaction(&self, signature: &str, blockhash: &BlockhashInfo) -> Result<Confirmation, Failure>;
}

/// Opens an [`RpcApi`] handle for an endpoint URL.
pub trait RpcConnector: Send + Sync {
    fn connect(&self, url: &str) -> Arc<dyn RpcApi>;
}

/// Build a [`Failure`] from an error chain, picking up reqwest status and transport flags.
pub fn failure_from_anyhow(origin: FailureOrigin, err: &anyhow::Error) -> Failure {
    let mut failure = Failure::new(origin, format!("{:#}", err));
    for cause in err.chain() {
        if let Some(http) = cause.downcast_ref::<reqwest::Error>() {
            if let Some(status) = http.status() {
                failure.status = Some(status.as_u16());
            }
            if http.is_connect() || http.is_timeout() || (http.is_request() && http.status().is_none()) {
                failure.transport = true;
            }
        }
    }
    failure
}

// Implement the traits for the concrete clients

#[async_trait]
impl QuoteApi for JupiterClient {
    async fn get_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<QuoteResponse, Failure> {
        self.get_swap_quote(input_mint, output_mint, amount, slippage_bps)
            .await
            .map_err(|e| failure_from_anyhow(FailureOrigin::QuoteService, &e))
    }

    async fn build_swap_transaction(
        &self,
        quote: &QuoteResponse,
        user_public_key: &str,
        wrap_and_unwrap_sol: bool,
    ) -> Result<String, Failure> {
        self.get_swap_transaction(quote, user_public_key, wrap_and_unwrap_sol)
            .await
            .map(|resp| resp.swap_transaction)
            .map_err(|e| failure_from_anyhow(FailureOrigin::SwapBuilder, &e))
    }
}

#[async_trait]
impl RpcApi for SolanaClient {
    fn url(&self) -> &str {
        SolanaClient::url(self)
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, Failure> {
        SolanaClient::get_balance(self, address)
            .await
            .map_err(|e| failure_from_anyhow(FailureOrigin::Rpc, &e))
    }

    async fn get_latest_blockhash(&self) -> Result<BlockhashInfo, Failure> {
        SolanaClient::get_latest_blockhash(self)
            .await
            .map(|(blockhash, last_valid_block_height)| BlockhashInfo {
                blockhash,
                last_valid_block_height,
            })
            .map_err(|e| failure_from_anyhow(FailureOrigin::Rpc, &e))
    }

    async fn send_raw_transaction(&self, wire_transaction: &[u8], options: SendOptions) -> Result<String, Failure> {
        SolanaClient::send_raw_transaction(self, wire_transaction, options)
            .await
            .map_err(|e| failure_from_anyhow(FailureOrigin::Submission, &e))
    }

    async fn confirm_transaction(&self, signature: &str, blockhash: &BlockhashInfo) -> Result<Confirmation, Failure> {
        SolanaClient::confirm_transaction(self, signature, blockhash.last_valid_block_height)
            .await
            .map_err(|e| failure_from_anyhow(FailureOrigin::Confirmation, &e))
    }
}

/// Connector producing [`SolanaClient`] handles.
#[derive(Debug, Clone)]
pub struct SolanaConnector {
    poll_interval: Duration,
}

impl SolanaConnector {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

impl Default for SolanaConnector {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl RpcConnector for SolanaConnector {
    fn connect(&self, url: &str) -> Arc<dyn RpcApi> {
        Arc::new(
            SolanaClient::builder()
                .rpc_url(url)
                .poll_interval(self.poll_interval)
                .build(),
        )
    }
}
