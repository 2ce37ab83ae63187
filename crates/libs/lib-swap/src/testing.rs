//! In-memory collaborators for tests. Every call is recorded.

use crate::service::{BlockhashInfo, QuoteApi, RpcApi, RpcConnector};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use lib_core::{Failure, FailureOrigin};
use lib_solana::client::{Confirmation, SendOptions};
use lib_solana::jupiter::{QuoteResponse, RoutePlanStep, SwapInfo};
use lib_solana::wallet::{self, ExternalSigner, WalletError};
use parking_lot::Mutex;
use solana_sdk::{
    hash::Hash,
    message::{Message, VersionedMessage},
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::VersionedTransaction,
};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

pub fn fake_blockhash() -> Hash {
    Hash::new_from_array([9u8; 32])
}

pub const FAKE_LAST_VALID_BLOCK_HEIGHT: u64 = 1_000;

pub fn fake_quote_response(input_mint: &str, output_mint: &str, in_amount: u64, out_amount: u64) -> QuoteResponse {
    QuoteResponse {
        input_mint: input_mint.to_string(),
        output_mint: output_mint.to_string(),
        in_amount: in_amount.to_string(),
        out_amount: out_amount.to_string(),
        price_impact_pct: "0.0012".to_string(),
        route_plan: vec![RoutePlanStep {
            swap_info: SwapInfo {
                amm_key: "fake-amm".to_string(),
                label: Some("Fake".to_string()),
                input_mint: input_mint.to_string(),
                output_mint: output_mint.to_string(),
                in_amount: in_amount.to_string(),
                out_amount: out_amount.to_string(),
                fee_amount: "0".to_string(),
                fee_mint: input_mint.to_string(),
            },
            percent: 100,
        }],
        slippage_bps: 50,
        extra: Default::default(),
    }
}

/// Unsigned single-signer transaction paying from `payer`, base64 encoded.
pub fn unsigned_swap_transaction(payer: &Pubkey) -> String {
    let message = Message::new(&[], Some(payer));
    let tx = VersionedTransaction {
        signatures: vec![Signature::default()],
        message: VersionedMessage::Legacy(message),
    };
    BASE64.encode(bincode::serialize(&tx).expect("serialize transaction"))
}

// region:    --- Quote service

/// Quotes `amount / 10` out for any pair.
#[derive(Default)]
pub struct FakeQuoteApi {
    quote_calls: Mutex<Vec<u64>>,
    completed_quotes: AtomicUsize,
    build_calls: Mutex<Vec<String>>,
    delays: Mutex<HashMap<u64, Duration>>,
    failure: Mutex<Option<Failure>>,
    build_failure: Mutex<Option<Failure>>,
    build_payload: Mutex<Option<String>>,
}

impl FakeQuoteApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay_for(&self, amount: u64, delay: Duration) {
        self.delays.lock().insert(amount, delay);
    }

    pub fn fail_with(&self, failure: Option<Failure>) {
        *self.failure.lock() = failure;
    }

    pub fn fail_build_with(&self, failure: Option<Failure>) {
        *self.build_failure.lock() = failure;
    }

    /// Return this payload from the build call instead of a valid transaction.
    pub fn build_returns(&self, payload: &str) {
        *self.build_payload.lock() = Some(payload.to_string());
    }

    pub fn quote_amounts(&self) -> Vec<u64> {
        self.quote_calls.lock().clone()
    }

    /// Quote calls that ran to the end of their delay.
    pub fn completed_quotes(&self) -> usize {
        self.completed_quotes.load(Ordering::SeqCst)
    }

    pub fn build_calls(&self) -> Vec<String> {
        self.build_calls.lock().clone()
    }
}

#[async_trait]
impl QuoteApi for FakeQuoteApi {
    async fn get_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        _slippage_bps: u16,
    ) -> Result<QuoteResponse, Failure> {
        self.quote_calls.lock().push(amount);
        let delay = self.delays.lock().get(&amount).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.completed_quotes.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.failure.lock().clone() {
            return Err(failure);
        }
        Ok(fake_quote_response(input_mint, output_mint, amount, amount / 10))
    }

    async fn build_swap_transaction(
        &self,
        _quote: &QuoteResponse,
        user_public_key: &str,
        _wrap_and_unwrap_sol: bool,
    ) -> Result<String, Failure> {
        self.build_calls.lock().push(user_public_key.to_string());
        if let Some(failure) = self.build_failure.lock().clone() {
            return Err(failure);
        }
        if let Some(payload) = self.build_payload.lock().clone() {
            return Ok(payload);
        }
        let payer = Pubkey::from_str(user_public_key)
            .map_err(|e| Failure::with_status(FailureOrigin::SwapBuilder, 400, e.to_string()))?;
        Ok(unsigned_swap_transaction(&payer))
    }
}

// endregion: --- Quote service

// region:    --- RPC

pub struct FakeRpc {
    balance: Mutex<u64>,
    balance_failure: Mutex<Option<Failure>>,
    balance_calls: Mutex<Vec<Pubkey>>,
    blockhash_calls: AtomicUsize,
    sent: Mutex<Vec<(Vec<u8>, SendOptions)>>,
    send_result: Mutex<Result<String, Failure>>,
    confirm_result: Mutex<Result<Confirmation, Failure>>,
    confirm_calls: Mutex<Vec<(String, BlockhashInfo)>>,
}

impl Default for FakeRpc {
    fn default() -> Self {
        Self {
            balance: Mutex::new(0),
            balance_failure: Mutex::new(None),
            balance_calls: Mutex::new(Vec::new()),
            blockhash_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            send_result: Mutex::new(Ok("abc123".to_string())),
            confirm_result: Mutex::new(Ok(Confirmation::Success)),
            confirm_calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeRpc {
    pub fn set_balance(&self, lamports: u64) {
        *self.balance.lock() = lamports;
    }

    pub fn fail_balance_with(&self, failure: Option<Failure>) {
        *self.balance_failure.lock() = failure;
    }

    pub fn send_returns(&self, result: Result<String, Failure>) {
        *self.send_result.lock() = result;
    }

    pub fn confirm_returns(&self, result: Result<Confirmation, Failure>) {
        *self.confirm_result.lock() = result;
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.lock().len()
    }

    pub fn blockhash_calls(&self) -> usize {
        self.blockhash_calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(Vec<u8>, SendOptions)> {
        self.sent.lock().clone()
    }

    pub fn confirm_calls(&self) -> Vec<(String, BlockhashInfo)> {
        self.confirm_calls.lock().clone()
    }

    /// Total number of network calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.balance_calls() + self.blockhash_calls() + self.sent.lock().len() + self.confirm_calls.lock().len()
    }
}

/// [`FakeRpc`] bound to a URL.
pub struct FakeRpcHandle {
    url: String,
    rpc: Arc<FakeRpc>,
}

#[async_trait]
impl RpcApi for FakeRpcHandle {
    fn url(&self) -> &str {
        &self.url
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, Failure> {
        self.rpc.balance_calls.lock().push(*address);
        if let Some(failure) = self.rpc.balance_failure.lock().clone() {
            return Err(failure);
        }
        Ok(*self.rpc.balance.lock())
    }

    async fn get_latest_blockhash(&self) -> Result<BlockhashInfo, Failure> {
        self.rpc.blockhash_calls.fetch_add(1, Ordering::SeqCst);
        Ok(BlockhashInfo {
            blockhash: fake_blockhash(),
            last_valid_block_height: FAKE_LAST_VALID_BLOCK_HEIGHT,
        })
    }

    async fn send_raw_transaction(&self, wire_transaction: &[u8], options: SendOptions) -> Result<String, Failure> {
        self.rpc.sent.lock().push((wire_transaction.to_vec(), options));
        self.rpc.send_result.lock().clone()
    }

    async fn confirm_transaction(&self, signature: &str, blockhash: &BlockhashInfo) -> Result<Confirmation, Failure> {
        self.rpc.confirm_calls.lock().push((signature.to_string(), *blockhash));
        self.rpc.confirm_result.lock().clone()
    }
}

/// Hands out handles to one shared [`FakeRpc`], recording each URL.
#[derive(Default)]
pub struct FakeConnector {
    pub rpc: Arc<FakeRpc>,
    urls: Mutex<Vec<String>>,
}

impl FakeConnector {
    pub fn connected_urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

impl RpcConnector for FakeConnector {
    fn connect(&self, url: &str) -> Arc<dyn RpcApi> {
        self.urls.lock().push(url.to_string());
        Arc::new(FakeRpcHandle {
            url: url.to_string(),
            rpc: Arc::clone(&self.rpc),
        })
    }
}

// endregion: --- RPC

// region:    --- Signer

/// External wallet that signs with an in-memory keypair.
///
/// With a gate installed, signing waits until the gate is notified.
pub struct FakeSigner {
    keypair: Keypair,
    connected: AtomicBool,
    reject: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
    sign_calls: AtomicUsize,
}

impl FakeSigner {
    pub fn new() -> Self {
        Self {
            keypair: Keypair::new(),
            connected: AtomicBool::new(true),
            reject: AtomicBool::new(false),
            gate: Mutex::new(None),
            sign_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn reject_requests(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    pub fn gate(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExternalSigner for FakeSigner {
    fn name(&self) -> &str {
        "Fake Wallet"
    }

    fn public_key(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn sign_transaction(&self, transaction: VersionedTransaction) -> Result<VersionedTransaction, WalletError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.reject.load(Ordering::SeqCst) {
            return Err(WalletError::Rejected("User rejected the request.".to_string()));
        }
        wallet::sign_local(transaction.message, &self.keypair)
    }
}

// endregion: --- Signer
