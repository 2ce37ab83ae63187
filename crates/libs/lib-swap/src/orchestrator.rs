//! # Swap Orchestrator
//!
//! Owns the [`SwapExecution`] record and drives one swap through
//! build, sign, send and confirm.
//!
//! ```text
//! Idle -> Preparing -> AwaitingSignature -> Submitting -> Confirmed
//!            |               |                  |            |
//!            +---------------+------------------+---------> Failed
//! ```
//!
//! `Confirmed` is entered optimistically once the RPC node accepts the
//! transaction and is corrected to `Failed` if confirmation reports a program
//! error. Terminal states return to `Idle` through [`SwapOrchestrator::reset`].
//!
//! The orchestrator reads the quote, balance and identity but never mutates
//! them; its only writable state is the execution record.

use crate::balance::BalanceTracker;
use crate::connection::Connection;
use crate::events::{EventBus, SwapEvent};
use crate::keys::KeyProvider;
use crate::quote_engine::{Quote, QuoteEngine};
use crate::service::{QuoteApi, RpcApi};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use lib_core::config::{
    DEFAULT_BALANCE_REFRESH_DELAY_MS, DEFAULT_FEE_RESERVE_LAMPORTS, DEFAULT_QUOTE_STALE_SECS, DEFAULT_SEND_MAX_RETRIES,
};
use lib_core::{Config, Failure, FailureOrigin, SwapError};
use lib_solana::client::{Confirmation, SendOptions};
use lib_solana::wallet::{Identity, WalletError};
use lib_utils::format_raw_amount;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use solana_sdk::transaction::VersionedTransaction;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

const NATIVE_DECIMALS: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SwapStatus {
    #[default]
    Idle,
    Preparing,
    AwaitingSignature,
    Submitting,
    Confirmed,
    Failed,
}

impl SwapStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            SwapStatus::Preparing | SwapStatus::AwaitingSignature | SwapStatus::Submitting
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SwapStatus::Confirmed | SwapStatus::Failed)
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SwapStatus::Idle => "Idle",
            SwapStatus::Preparing => "Preparing transaction...",
            SwapStatus::AwaitingSignature => "Awaiting signature...",
            SwapStatus::Submitting => "Sending transaction...",
            SwapStatus::Confirmed => "Swap successful",
            SwapStatus::Failed => "Swap failed",
        };
        f.write_str(s)
    }
}

/// The orchestrator's mutable record. One per orchestrator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwapExecution {
    pub status: SwapStatus,
    pub signature: Option<String>,
    pub last_error: Option<SwapError>,
}

#[derive(Debug, Clone, Copy)]
pub struct SwapSettings {
    /// Native balance that must remain after the swap amount.
    pub fee_reserve_lamports: u64,
    pub quote_stale_after: Duration,
    pub balance_refresh_delay: Duration,
    pub send_max_retries: usize,
}

impl Default for SwapSettings {
    fn default() -> Self {
        Self {
            fee_reserve_lamports: DEFAULT_FEE_RESERVE_LAMPORTS,
            quote_stale_after: Duration::from_secs(DEFAULT_QUOTE_STALE_SECS),
            balance_refresh_delay: Duration::from_millis(DEFAULT_BALANCE_REFRESH_DELAY_MS),
            send_max_retries: DEFAULT_SEND_MAX_RETRIES,
        }
    }
}

impl From<&Config> for SwapSettings {
    fn from(config: &Config) -> Self {
        Self {
            fee_reserve_lamports: config.fee_reserve_lamports,
            quote_stale_after: config.quote_stale_after,
            balance_refresh_delay: config.balance_refresh_delay,
            send_max_retries: config.send_max_retries,
        }
    }
}

struct Inner {
    quotes: QuoteEngine,
    balance: BalanceTracker,
    keys: Arc<RwLock<KeyProvider>>,
    connection: Arc<Connection>,
    quote_api: Arc<dyn QuoteApi>,
    settings: SwapSettings,
    events: EventBus,
    execution: Mutex<ExecutionState>,
}

#[derive(Default)]
struct ExecutionState {
    record: SwapExecution,
    /// Set from leaving `Idle` until confirmation resolves, which outlasts the
    /// optimistic `Confirmed` status.
    running: bool,
}

/// Everything a validated swap needs, captured before leaving `Idle`.
struct Prepared {
    quote: Arc<Quote>,
    identity: Identity,
}

#[derive(Clone)]
pub struct SwapOrchestrator {
    inner: Arc<Inner>,
}

impl SwapOrchestrator {
    pub fn new(
        quotes: QuoteEngine,
        balance: BalanceTracker,
        keys: Arc<RwLock<KeyProvider>>,
        connection: Arc<Connection>,
        quote_api: Arc<dyn QuoteApi>,
        settings: SwapSettings,
        events: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                quotes,
                balance,
                keys,
                connection,
                quote_api,
                settings,
                events,
                execution: Mutex::new(ExecutionState::default()),
            }),
        }
    }

    pub fn execution(&self) -> SwapExecution {
        self.inner.execution.lock().record.clone()
    }

    pub fn status(&self) -> SwapStatus {
        self.inner.execution.lock().record.status
    }

    /// Whether a swap is between leaving `Idle` and its final outcome.
    pub fn is_running(&self) -> bool {
        self.inner.execution.lock().running
    }

    /// Execute the held quote with the active identity. Returns the signature.
    ///
    /// Rejected without any change while another swap is in flight. From
    /// `Confirmed` or `Failed` the record is replaced once the preconditions
    /// pass. Precondition failures are recorded as the last error and leave
    /// status and signature untouched.
    ///
    /// Dropping the returned future mid-pipeline fails the swap and releases
    /// the orchestrator.
    #[instrument(skip(self))]
    pub async fn execute_swap(&self) -> Result<String, SwapError> {
        let prepared = {
            let mut state = self.inner.execution.lock();
            if state.running {
                return Err(SwapError::Validation(
                    "A swap is already in progress".to_string(),
                ));
            }

            match self.check_preconditions() {
                Ok(prepared) => {
                    // Implicit reset from a finished swap, only once the new one can start.
                    state.record = SwapExecution {
                        status: SwapStatus::Preparing,
                        ..SwapExecution::default()
                    };
                    state.running = true;
                    prepared
                }
                Err(err) => {
                    warn!("swap rejected: {}", err.message());
                    state.record.last_error = Some(err.clone());
                    return Err(err);
                }
            }
        };
        let mut guard = RunGuard {
            orchestrator: self,
            finished: false,
        };
        self.publish_status(SwapStatus::Preparing, None);

        let quote_age = prepared.quote.age();
        if prepared.quote.is_stale(self.inner.settings.quote_stale_after) {
            warn!(age_secs = quote_age.as_secs(), "executing a stale quote");
            self.inner.events.publish(SwapEvent::QuoteStale {
                age_secs: quote_age.as_secs(),
            });
        }

        // One endpoint for the whole pipeline.
        let rpc = self.inner.connection.client();
        let result = self.run_pipeline(&prepared, rpc.as_ref()).await;

        let signature = {
            let mut state = self.inner.execution.lock();
            state.running = false;
            guard.finished = true;
            if let Err(err) = &result {
                state.record.status = SwapStatus::Failed;
                state.record.last_error = Some(err.clone());
            }
            state.record.signature.clone()
        };

        // Fees are spent once a signature exists, whatever the outcome.
        if signature.is_some() {
            self.inner.balance.schedule_refresh(self.inner.settings.balance_refresh_delay);
        }

        match result {
            Ok(signature) => {
                info!(signature = %signature, "swap confirmed");
                Ok(signature)
            }
            Err(err) => {
                error!(kind = ?err.kind(), signature = ?signature, "swap failed: {}", err);
                self.publish_status(SwapStatus::Failed, signature);
                Err(err)
            }
        }
    }

    /// Return from `Confirmed` or `Failed` to `Idle`, keeping quote and identity.
    ///
    /// No-op when already idle. Refused while a swap is in flight.
    pub fn reset(&self) -> Result<(), SwapError> {
        let mut state = self.inner.execution.lock();
        if state.running {
            return Err(SwapError::Validation(
                "Cannot reset while a swap is in progress".to_string(),
            ));
        }
        let was_idle = state.record.status == SwapStatus::Idle;
        state.record = SwapExecution::default();
        drop(state);

        if !was_idle {
            self.publish_status(SwapStatus::Idle, None);
        }
        Ok(())
    }

    fn check_preconditions(&self) -> Result<Prepared, SwapError> {
        let quote = self
            .inner
            .quotes
            .quote()
            .ok_or_else(|| SwapError::Validation("No quote available. Enter an amount to get a quote.".to_string()))?;
        let amount = quote.request.validate()?;

        let identity = self
            .inner
            .keys
            .read()
            .active()
            .ok_or_else(|| SwapError::Validation("No wallet connected".to_string()))?;

        let balance = self.inner.balance.lamports_for(&identity.public_key());
        let reserve = self.inner.settings.fee_reserve_lamports;

        if quote.request.input.is_native() && amount > balance {
            return Err(SwapError::Validation("Insufficient SOL balance".to_string()));
        }

        if balance < reserve {
            return Err(SwapError::Validation(format!(
                "Insufficient SOL for transaction fees. Minimum {} SOL required.",
                sol_trimmed(reserve)
            )));
        }

        if quote.request.input.is_native() && amount.saturating_add(reserve) > balance {
            return Err(SwapError::Validation(format!(
                "Insufficient SOL. Need {} SOL ({} + {} for fees), but only have {} SOL",
                format_raw_amount(amount.saturating_add(reserve), NATIVE_DECIMALS, 4),
                quote.request.amount.trim(),
                sol_trimmed(reserve),
                format_raw_amount(balance, NATIVE_DECIMALS, 4),
            )));
        }

        Ok(Prepared { quote, identity })
    }

    async fn run_pipeline(&self, prepared: &Prepared, rpc: &dyn RpcApi) -> Result<String, SwapError> {
        let user = prepared.identity.public_key();
        debug!(
            user = %user,
            input = prepared.quote.request.input.symbol,
            output = prepared.quote.request.output.symbol,
            amount = prepared.quote.in_amount_raw,
            endpoint = rpc.url(),
            "building swap transaction"
        );

        // -- Preparing: build, decode, attach a fresh blockhash
        let encoded = self
            .inner
            .quote_api
            .build_swap_transaction(&prepared.quote.response, &user.to_string(), true)
            .await
            .map_err(|f| f.classify())?;
        let mut transaction = decode_transaction(&encoded)?;

        let blockhash = rpc.get_latest_blockhash().await.map_err(|f| f.classify())?;
        transaction.message.set_recent_blockhash(blockhash.blockhash);
        debug!(
            blockhash = %blockhash.blockhash,
            last_valid_block_height = blockhash.last_valid_block_height,
            "attached fresh blockhash"
        );
        self.transition(SwapStatus::AwaitingSignature);

        // -- AwaitingSignature
        let signed = prepared.identity.sign(transaction).await.map_err(signing_error)?;
        self.transition(SwapStatus::Submitting);

        // -- Submitting
        let wire = bincode::serialize(&signed).map_err(|e| {
            Failure::new(FailureOrigin::Submission, format!("Failed to serialize transaction: {}", e)).classify()
        })?;
        let options = SendOptions {
            skip_preflight: false,
            max_retries: self.inner.settings.send_max_retries,
        };
        let signature = rpc
            .send_raw_transaction(&wire, options)
            .await
            .map_err(|f| f.classify())?;

        info!(signature = %signature, "transaction submitted");
        {
            let mut state = self.inner.execution.lock();
            state.record.status = SwapStatus::Confirmed;
            state.record.signature = Some(signature.clone());
        }
        self.publish_status(SwapStatus::Confirmed, Some(signature.clone()));

        // -- Confirmation may still demote to Failed
        match rpc.confirm_transaction(&signature, &blockhash).await {
            Ok(Confirmation::Success) => Ok(signature),
            Ok(Confirmation::Failed(payload)) => Err(SwapError::OnChainExecution(payload)),
            Err(failure) => Err(failure.classify()),
        }
    }

    fn transition(&self, status: SwapStatus) {
        self.inner.execution.lock().record.status = status;
        self.publish_status(status, None);
    }

    fn publish_status(&self, status: SwapStatus, signature: Option<String>) {
        self.inner.events.publish(SwapEvent::StatusChanged { status, signature });
    }
}

/// Releases the orchestrator when an `execute_swap` future ends early.
struct RunGuard<'a> {
    orchestrator: &'a SwapOrchestrator,
    finished: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut state = self.orchestrator.inner.execution.lock();
        state.running = false;
        // Past submission the optimistic Confirmed stands.
        if !state.record.status.is_in_flight() {
            return;
        }
        state.record.status = SwapStatus::Failed;
        state.record.last_error = Some(SwapError::Unknown(
            "Swap was cancelled before it completed".to_string(),
        ));
        let signature = state.record.signature.clone();
        drop(state);

        warn!("swap cancelled mid-pipeline");
        self.orchestrator.publish_status(SwapStatus::Failed, signature);
    }
}

fn decode_transaction(encoded: &str) -> Result<VersionedTransaction, SwapError> {
    let bytes = BASE64.decode(encoded.trim()).map_err(|e| {
        Failure::new(FailureOrigin::SwapBuilder, format!("Failed to decode swap transaction: {}", e)).classify()
    })?;
    bincode::deserialize(&bytes).map_err(|e| {
        Failure::new(FailureOrigin::SwapBuilder, format!("Failed to deserialize swap transaction: {}", e)).classify()
    })
}

fn signing_error(err: WalletError) -> SwapError {
    match err {
        WalletError::Disconnected | WalletError::NoSigner => SwapError::Validation(err.to_string()),
        other => Failure::new(FailureOrigin::Signer, other.to_string()).classify(),
    }
}

/// Lamports as SOL without trailing zeros, e.g. "0.01".
fn sol_trimmed(lamports: u64) -> String {
    let s = format_raw_amount(lamports, NATIVE_DECIMALS, NATIVE_DECIMALS as usize);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
