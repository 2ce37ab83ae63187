//! # Swap Session
//!
//! Wires the components for one user session and exposes the operations a
//! display layer drives: token and amount selection, wallet management,
//! network and endpoint switching, swap execution. [`SwapSession::snapshot`]
//! is the single observable view of everything.

use crate::balance::{Balance, BalanceTracker};
use crate::connection::Connection;
use crate::events::{EventBus, SwapEvent};
use crate::keys::KeyProvider;
use crate::orchestrator::{SwapOrchestrator, SwapSettings, SwapStatus};
use crate::quote_engine::{Quote, QuoteEngine, QuoteSettings};
use crate::request::SwapRequest;
use crate::service::{QuoteApi, RpcConnector, SolanaConnector};
use anyhow::Context;
use lib_core::{Config, ErrorKind, Network, SwapError};
use lib_solana::endpoints::RpcEndpointSelector;
use lib_solana::jupiter::JupiterClient;
use lib_solana::tokens::TokenPair;
use lib_solana::wallet::{self, ExternalSigner, IdentityKind};
use lib_utils::{format_price_impact, format_raw_amount, shorten_address};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

// region:    --- Snapshot

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub network: &'static str,
    pub endpoint: String,
    pub endpoint_label: &'static str,
    pub input: &'static str,
    pub output: &'static str,
    pub amount: String,
    pub address: Option<String>,
    pub address_short: Option<String>,
    pub identity: Option<IdentityKind>,
    /// Native balance in SOL, four decimals.
    pub balance_sol: String,
    pub quote: Option<QuoteSummary>,
    pub loading: bool,
    pub status: SwapStatus,
    pub status_text: String,
    pub signature: Option<String>,
    pub explorer_url: Option<String>,
    pub last_error: Option<ErrorSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteSummary {
    pub receive_amount: String,
    pub output_symbol: &'static str,
    pub price_impact: String,
    pub route_hops: usize,
    pub age_secs: u64,
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorSummary {
    pub kind: ErrorKind,
    pub message: String,
    pub hint: &'static str,
}

impl From<&SwapError> for ErrorSummary {
    fn from(err: &SwapError) -> Self {
        Self {
            kind: err.kind(),
            message: err.message().to_string(),
            hint: err.hint(),
        }
    }
}

// endregion: --- Snapshot

struct Form {
    pair: TokenPair,
    amount: String,
}

pub struct SwapSession {
    connection: Arc<Connection>,
    keys: Arc<RwLock<KeyProvider>>,
    quotes: QuoteEngine,
    balance: BalanceTracker,
    orchestrator: SwapOrchestrator,
    events: EventBus,
    form: Mutex<Form>,
    swap_settings: SwapSettings,
}

impl SwapSession {
    pub fn new(
        selector: RpcEndpointSelector,
        quote_api: Arc<dyn QuoteApi>,
        connector: Arc<dyn RpcConnector>,
        quote_settings: QuoteSettings,
        swap_settings: SwapSettings,
    ) -> Self {
        let network = selector.network();
        let events = EventBus::new();
        let connection = Arc::new(Connection::new(selector, connector));
        let keys = Arc::new(RwLock::new(KeyProvider::new()));
        let quotes = QuoteEngine::new(Arc::clone(&quote_api), quote_settings, events.clone());
        let balance = BalanceTracker::new(Arc::clone(&connection), Arc::clone(&keys), events.clone());
        let orchestrator = SwapOrchestrator::new(
            quotes.clone(),
            balance.clone(),
            Arc::clone(&keys),
            Arc::clone(&connection),
            quote_api,
            swap_settings,
            events.clone(),
        );

        Self {
            connection,
            keys,
            quotes,
            balance,
            orchestrator,
            events,
            form: Mutex::new(Form {
                pair: TokenPair::default_for(network),
                amount: String::new(),
            }),
            swap_settings,
        }
    }

    /// Session against the live quoting service and RPC endpoints.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let selector = RpcEndpointSelector::from_config(config).context("Failed to build RPC endpoint list")?;
        let jupiter = JupiterClient::builder()
            .timeout(config.jupiter_timeout)
            .quote_api_base(config.jupiter_api_base.clone())
            .build()
            .context("Failed to build Jupiter client")?;

        let quote_settings = QuoteSettings {
            debounce: config.quote_debounce,
            slippage_bps: config.slippage_bps,
        };

        Ok(Self::new(
            selector,
            Arc::new(jupiter),
            Arc::new(SolanaConnector::default()),
            quote_settings,
            SwapSettings::from(config),
        ))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SwapEvent> {
        self.events.subscribe()
    }

    pub fn network(&self) -> Network {
        self.connection.network()
    }

    pub fn pair(&self) -> TokenPair {
        self.form.lock().pair
    }

    pub fn amount(&self) -> String {
        self.form.lock().amount.clone()
    }

    pub fn quote(&self) -> Option<Arc<Quote>> {
        self.quotes.quote()
    }

    pub fn balance(&self) -> Balance {
        self.balance.balance()
    }

    pub fn status(&self) -> SwapStatus {
        self.orchestrator.status()
    }

    // -- Form

    pub fn select_input(&self, symbol: &str) -> Result<(), SwapError> {
        self.update_form(|form| form.pair.select_input(symbol), symbol)
    }

    pub fn select_output(&self, symbol: &str) -> Result<(), SwapError> {
        self.update_form(|form| form.pair.select_output(symbol), symbol)
    }

    /// Record the typed amount; a quote follows after the debounce window.
    pub fn set_amount(&self, amount: impl Into<String>) {
        self.form.lock().amount = amount.into();
        self.quotes.set_request(self.current_request());
    }

    /// Quote the current form immediately.
    pub async fn quote_now(&self) -> Result<Arc<Quote>, SwapError> {
        self.quotes.request_quote(self.current_request()).await
    }

    pub async fn refresh_quote(&self) -> Result<Arc<Quote>, SwapError> {
        self.quotes.refresh().await
    }

    fn update_form(&self, f: impl FnOnce(&mut Form) -> bool, symbol: &str) -> Result<(), SwapError> {
        let request = {
            let mut form = self.form.lock();
            if !f(&mut *form) {
                return Err(SwapError::Validation(format!(
                    "Token {} is not available on {}",
                    symbol,
                    form.pair.network.display_name()
                )));
            }
            SwapRequest::new(form.pair.input, form.pair.output, form.amount.clone())
        };
        self.quotes.set_request(request);
        Ok(())
    }

    fn current_request(&self) -> SwapRequest {
        let form = self.form.lock();
        SwapRequest::new(form.pair.input, form.pair.output, form.amount.clone())
    }

    // -- Wallet

    pub async fn create_local_wallet(&self) -> Result<Pubkey, SwapError> {
        self.ensure_not_running()?;
        let pubkey = self.keys.write().create_local()?;
        self.identity_changed().await;
        Ok(pubkey)
    }

    pub async fn remove_local_wallet(&self) -> Result<bool, SwapError> {
        self.ensure_not_running()?;
        let removed = self.keys.write().remove_local();
        if removed {
            self.identity_changed().await;
        }
        Ok(removed)
    }

    pub async fn connect_external(&self, signer: Arc<dyn ExternalSigner>) -> Result<Pubkey, SwapError> {
        self.ensure_not_running()?;
        let pubkey = self.keys.write().connect_external(signer)?;
        self.identity_changed().await;
        Ok(pubkey)
    }

    pub async fn disconnect_external(&self) -> Result<bool, SwapError> {
        self.ensure_not_running()?;
        let disconnected = self.keys.write().disconnect_external();
        if disconnected {
            self.identity_changed().await;
        }
        Ok(disconnected)
    }

    /// Hex secret of the local wallet for backup. Never logged.
    pub fn export_local_secret(&self) -> Option<String> {
        let secret = self.keys.read().export_local_secret();
        if secret.is_some() {
            info!("local wallet secret exported");
        }
        secret
    }

    async fn identity_changed(&self) {
        self.events.publish(SwapEvent::IdentityChanged);
        // Failures are held by the tracker and surface in the snapshot.
        let _ = self.balance.refresh().await;
    }

    // -- Network and endpoints

    /// Switch network. Tokens are re-resolved by symbol and the quote re-requested.
    pub async fn switch_network(&self, network: Network) -> Result<(), SwapError> {
        self.ensure_not_running()?;
        let url = self.connection.set_network(network);

        let request = {
            let mut form = self.form.lock();
            form.pair = form.pair.on_network(network);
            SwapRequest::new(form.pair.input, form.pair.output, form.amount.clone())
        };
        self.quotes.clear();
        self.quotes.set_request(request);

        self.events.publish(SwapEvent::EndpointChanged { url });
        let _ = self.balance.refresh().await;
        Ok(())
    }

    /// Rotate to the next RPC endpoint. Returns the new URL.
    pub async fn switch_rpc(&self) -> String {
        let url = self.connection.advance();
        self.events.publish(SwapEvent::EndpointChanged { url: url.clone() });
        let _ = self.balance.refresh().await;
        url
    }

    pub async fn refresh_balance(&self) -> Result<Balance, SwapError> {
        self.balance.refresh().await
    }

    // -- Swap

    pub async fn execute_swap(&self) -> Result<String, SwapError> {
        self.orchestrator.execute_swap().await
    }

    pub fn reset_swap(&self) -> Result<(), SwapError> {
        self.orchestrator.reset()
    }

    fn ensure_not_running(&self) -> Result<(), SwapError> {
        if self.orchestrator.is_running() {
            return Err(SwapError::Validation(
                "Wait for the current swap to finish".to_string(),
            ));
        }
        Ok(())
    }

    // -- Observation

    pub fn snapshot(&self) -> SessionSnapshot {
        let network = self.connection.network();
        let (pair, amount) = {
            let form = self.form.lock();
            (form.pair, form.amount.clone())
        };
        let identity = self.keys.read().active();
        let quotes = self.quotes.snapshot();
        let execution = self.orchestrator.execution();

        let address = identity.as_ref().map(|id| id.public_key().to_string());
        let lamports = identity
            .as_ref()
            .map_or(0, |id| self.balance.lamports_for(&id.public_key()));

        let stale_after = self.swap_settings.quote_stale_after;
        let quote = quotes.quote.as_ref().map(|quote| QuoteSummary {
            receive_amount: quote.receive_amount_display(),
            output_symbol: quote.request.output.symbol,
            price_impact: format_price_impact(quote.price_impact),
            route_hops: quote.route_hops,
            age_secs: quote.age().as_secs(),
            stale: quote.is_stale(stale_after),
        });

        let last_error = execution
            .last_error
            .as_ref()
            .or(quotes.error.as_ref())
            .map(ErrorSummary::from)
            .or_else(|| self.balance.error().as_ref().map(ErrorSummary::from));

        SessionSnapshot {
            network: network.display_name(),
            endpoint: self.connection.endpoint(),
            endpoint_label: self.connection.label(),
            input: pair.input.symbol,
            output: pair.output.symbol,
            amount,
            address_short: address.as_deref().map(shorten_address),
            address,
            identity: identity.as_ref().map(|id| id.kind()),
            balance_sol: format_raw_amount(lamports, 9, 4),
            quote,
            loading: quotes.loading,
            status: execution.status,
            status_text: execution.status.to_string(),
            explorer_url: execution
                .signature
                .as_deref()
                .map(|sig| wallet::explorer_tx_url(sig, network)),
            signature: execution.signature,
            last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeConnector, FakeQuoteApi, FakeSigner};
    use lib_core::{Failure, FailureOrigin};
    use std::time::Duration;

    const SOL: u64 = 1_000_000_000;

    struct Fixture {
        session: SwapSession,
        api: Arc<FakeQuoteApi>,
        connector: Arc<FakeConnector>,
    }

    fn fixture() -> Fixture {
        let api = Arc::new(FakeQuoteApi::new());
        let connector = Arc::new(FakeConnector::default());
        let selector = RpcEndpointSelector::with_defaults(Network::Mainnet, None).unwrap();
        let session = SwapSession::new(
            selector,
            api.clone(),
            connector.clone(),
            QuoteSettings::default(),
            SwapSettings::default(),
        );
        Fixture { session, api, connector }
    }

    #[tokio::test]
    async fn test_initial_snapshot() {
        let f = fixture();
        let snap = f.session.snapshot();

        assert_eq!(snap.network, "Mainnet-Beta");
        assert_eq!(snap.endpoint, "https://api.mainnet-beta.solana.com");
        assert_eq!(snap.endpoint_label, "Solana Labs");
        assert_eq!((snap.input, snap.output), ("SOL", "USDC"));
        assert!(snap.address.is_none());
        assert_eq!(snap.balance_sol, "0.0000");
        assert_eq!(snap.status, SwapStatus::Idle);
        assert!(snap.last_error.is_none());
    }

    #[tokio::test]
    async fn test_create_local_wallet_refreshes_balance() {
        let f = fixture();
        f.connector.rpc.set_balance(2 * SOL);
        let mut rx = f.session.subscribe();

        let pubkey = f.session.create_local_wallet().await.unwrap();

        let snap = f.session.snapshot();
        assert_eq!(snap.address, Some(pubkey.to_string()));
        assert_eq!(snap.address_short, Some(shorten_address(&pubkey.to_string())));
        assert_eq!(snap.identity, Some(IdentityKind::Local));
        assert_eq!(snap.balance_sol, "2.0000");
        assert_eq!(rx.try_recv().unwrap(), SwapEvent::IdentityChanged);
    }

    #[tokio::test]
    async fn test_connect_external_replaces_local_wallet() {
        let f = fixture();
        f.session.create_local_wallet().await.unwrap();
        let signer = Arc::new(FakeSigner::new());

        let pubkey = f.session.connect_external(signer).await.unwrap();

        let snap = f.session.snapshot();
        assert_eq!(snap.address, Some(pubkey.to_string()));
        assert_eq!(snap.identity, Some(IdentityKind::External("Fake Wallet".to_string())));
        assert!(f.session.export_local_secret().is_none());
        assert_eq!(f.connector.rpc.balance_calls(), 2);
    }

    #[tokio::test]
    async fn test_export_local_secret_is_hex() {
        let f = fixture();
        f.session.create_local_wallet().await.unwrap();

        let secret = f.session.export_local_secret().unwrap();

        assert_eq!(secret.len(), 128);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_amount_quotes_after_debounce() {
        let f = fixture();
        f.session.set_amount("1.5");
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert!(f.api.quote_amounts().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;

        let snap = f.session.snapshot();
        let quote = snap.quote.unwrap();
        assert_eq!(quote.receive_amount, "150.000000");
        assert_eq!(quote.output_symbol, "USDC");
        assert_eq!(quote.price_impact, "0.12%");
        assert_eq!(quote.route_hops, 1);
        assert!(!quote.stale);
        assert_eq!(f.api.quote_amounts(), vec![1_500_000_000]);
    }

    #[tokio::test]
    async fn test_select_same_token_flips_other_side() {
        let f = fixture();
        f.session.select_output("SOL").unwrap();

        let pair = f.session.pair();
        assert_eq!(pair.output.symbol, "SOL");
        assert_ne!(pair.input.symbol, "SOL");

        let err = f.session.select_input("DOGE").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_switch_network_re_resolves_tokens() {
        let f = fixture();
        f.session.create_local_wallet().await.unwrap();
        f.session.set_amount("1");
        f.session.quote_now().await.unwrap();

        f.session.switch_network(Network::Devnet).await.unwrap();

        let snap = f.session.snapshot();
        assert_eq!(snap.network, "Devnet");
        assert_eq!(snap.endpoint, "https://api.devnet.solana.com");
        assert!(snap.quote.is_none());
        let pair = f.session.pair();
        assert_eq!(pair.network, Network::Devnet);
        assert_eq!(pair.output.mint, "4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU");
        assert_eq!(f.connector.rpc.balance_calls(), 2);

        let quote = f.session.quote_now().await.unwrap();
        assert_eq!(quote.response.output_mint, pair.output.mint);
    }

    #[tokio::test]
    async fn test_switch_rpc_rotates_and_refreshes() {
        let f = fixture();
        f.session.create_local_wallet().await.unwrap();
        let mut rx = f.session.subscribe();

        let url = f.session.switch_rpc().await;

        assert_eq!(url, "https://solana-api.projectserum.com");
        assert_eq!(f.session.snapshot().endpoint_label, "Project Serum");
        assert_eq!(f.connector.rpc.balance_calls(), 2);
        assert_eq!(rx.try_recv().unwrap(), SwapEvent::EndpointChanged { url });
    }

    #[tokio::test]
    async fn test_swap_through_session() {
        let f = fixture();
        f.connector.rpc.set_balance(2 * SOL);
        f.session.create_local_wallet().await.unwrap();
        f.session.set_amount("1.5");
        f.session.quote_now().await.unwrap();

        let signature = f.session.execute_swap().await.unwrap();

        let snap = f.session.snapshot();
        assert_eq!(snap.status, SwapStatus::Confirmed);
        assert_eq!(snap.signature.as_deref(), Some(signature.as_str()));
        assert_eq!(
            snap.explorer_url.as_deref(),
            Some("https://explorer.solana.com/tx/abc123")
        );

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["status"], "Confirmed");
        assert_eq!(json["quote"]["receive_amount"], "150.000000");

        f.session.reset_swap().unwrap();
        let snap = f.session.snapshot();
        assert_eq!(snap.status, SwapStatus::Idle);
        assert!(snap.signature.is_none());
        assert!(snap.quote.is_some());
    }

    #[tokio::test]
    async fn test_last_error_precedence() {
        let f = fixture();
        f.connector
            .rpc
            .fail_balance_with(Some(Failure::transport(FailureOrigin::Rpc, "connection refused")));
        f.session.create_local_wallet().await.unwrap();
        assert_eq!(
            f.session.snapshot().last_error.unwrap().kind,
            ErrorKind::NetworkUnavailable
        );

        f.api
            .fail_with(Some(Failure::with_status(FailureOrigin::QuoteService, 403, "Forbidden")));
        f.session.set_amount("1");
        f.session.quote_now().await.unwrap_err();
        let error = f.session.snapshot().last_error.unwrap();
        assert_eq!(error.kind, ErrorKind::RateLimited);
        assert!(error.hint.contains("Switch RPC"));

        let err = f.session.execute_swap().await.unwrap_err();
        assert_eq!(f.session.snapshot().last_error, Some(ErrorSummary::from(&err)));
    }

    #[tokio::test]
    async fn test_wallet_changes_refused_while_swap_running() {
        let f = fixture();
        f.connector.rpc.set_balance(2 * SOL);
        let signer = Arc::new(FakeSigner::new());
        f.session.connect_external(signer.clone()).await.unwrap();
        f.session.set_amount("1");
        f.session.quote_now().await.unwrap();
        let gate = signer.gate();

        let session = Arc::new(f.session);
        let task = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.execute_swap().await })
        };
        while session.status() != SwapStatus::AwaitingSignature {
            tokio::task::yield_now().await;
        }

        assert!(session.disconnect_external().await.is_err());
        assert!(session.switch_network(Network::Devnet).await.is_err());

        gate.notify_one();
        task.await.unwrap().unwrap();
        assert!(session.disconnect_external().await.unwrap());
    }
}
