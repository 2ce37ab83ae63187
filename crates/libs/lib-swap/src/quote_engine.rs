//! # Quote Engine
//!
//! Debounced, ordered acquisition of swap quotes.
//!
//! ## Ordering
//!
//! Every issued request takes a ticket from a monotonically increasing
//! sequence. A result is applied only if its ticket is still the latest when it
//! arrives, so the held quote always answers the most recently *issued*
//! request, regardless of which network call finishes first. Superseded calls
//! are not aborted; their results are discarded on arrival.
//!
//! ## Debouncing
//!
//! [`QuoteEngine::set_request`] schedules a fetch after the debounce window.
//! A newer call aborts the pending timer and schedules its own. Once the timer
//! has fired the fetch is left to finish like any other superseded call.

use crate::events::{EventBus, SwapEvent};
use crate::request::SwapRequest;
use crate::service::QuoteApi;
use lib_core::{Failure, FailureOrigin, SwapError};
use lib_solana::jupiter::QuoteResponse;
use lib_utils::format_raw_amount;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// A fetched quote. Immutable; replaced wholesale when superseded.
#[derive(Debug, Clone)]
pub struct Quote {
    /// The request this quote answers.
    pub request: SwapRequest,
    /// Raw service payload, posted back when building the swap transaction.
    pub response: QuoteResponse,
    pub in_amount_raw: u64,
    pub out_amount_raw: u64,
    /// Price impact as a fraction (0.0012 = 0.12%).
    pub price_impact: f64,
    pub route_hops: usize,
    pub fetched_at: Instant,
}

impl Quote {
    fn from_response(request: SwapRequest, in_amount_raw: u64, response: QuoteResponse) -> Result<Self, SwapError> {
        let out_amount_raw = response
            .out_amount_raw()
            .map_err(|e| Failure::new(FailureOrigin::QuoteService, e.to_string()).classify())?;

        Ok(Self {
            request,
            in_amount_raw,
            out_amount_raw,
            price_impact: response.price_impact_fraction(),
            route_hops: response.hop_count(),
            response,
            fetched_at: Instant::now(),
        })
    }

    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    /// Advisory only: stale quotes are warned about, never blocked.
    pub fn is_stale(&self, threshold: Duration) -> bool {
        self.age() > threshold
    }

    /// Receive amount in output token units, six decimals.
    pub fn receive_amount_display(&self) -> String {
        format_raw_amount(self.out_amount_raw, self.request.output.decimals, 6)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QuoteSettings {
    pub debounce: Duration,
    pub slippage_bps: u16,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(lib_core::config::DEFAULT_QUOTE_DEBOUNCE_MS),
            slippage_bps: lib_core::config::DEFAULT_SLIPPAGE_BPS,
        }
    }
}

/// Point-in-time view of the engine.
#[derive(Debug, Clone, Default)]
pub struct QuoteSnapshot {
    pub request: Option<SwapRequest>,
    pub quote: Option<Arc<Quote>>,
    pub error: Option<SwapError>,
    pub loading: bool,
}

#[derive(Default)]
struct QuoteState {
    seq: u64,
    request: Option<SwapRequest>,
    quote: Option<Arc<Quote>>,
    error: Option<SwapError>,
    loading: bool,
}

struct Inner {
    api: Arc<dyn QuoteApi>,
    settings: QuoteSettings,
    events: EventBus,
    state: RwLock<QuoteState>,
    /// Debounce timer and the ticket it will fetch for.
    pending: Mutex<Option<(u64, JoinHandle<()>)>>,
}

/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct QuoteEngine {
    inner: Arc<Inner>,
}

impl QuoteEngine {
    pub fn new(api: Arc<dyn QuoteApi>, settings: QuoteSettings, events: EventBus) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                settings,
                events,
                state: RwLock::new(QuoteState::default()),
                pending: Mutex::new(None),
            }),
        }
    }

    /// Record new input and fetch a quote after the debounce window.
    ///
    /// Invalid input is handled immediately without any network call.
    /// Must be called from within a tokio runtime.
    pub fn set_request(&self, request: SwapRequest) {
        let mut pending = self.inner.pending.lock();
        if let Some((_, handle)) = pending.take() {
            handle.abort();
        }

        let Ok((ticket, amount)) = self.begin(request.clone()) else {
            return;
        };

        let engine = self.clone();
        let debounce = self.inner.settings.debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // Leave the pending slot so later input no longer aborts the fetch.
            {
                let mut pending = engine.inner.pending.lock();
                match pending.as_ref() {
                    Some((current, _)) if *current == ticket => {
                        pending.take();
                    }
                    _ => return,
                }
            }
            let _ = engine.fetch(ticket, request, amount).await;
        });
        *pending = Some((ticket, handle));
    }

    /// Fetch a quote for `request` immediately.
    ///
    /// The returned quote is only held by the engine if no newer request was
    /// issued while this one was in flight.
    pub async fn request_quote(&self, request: SwapRequest) -> Result<Arc<Quote>, SwapError> {
        self.cancel_pending();
        let (ticket, amount) = self.begin(request.clone())?;
        self.fetch(ticket, request, amount).await
    }

    /// Re-issue the current request immediately.
    pub async fn refresh(&self) -> Result<Arc<Quote>, SwapError> {
        let request = self
            .inner
            .state
            .read()
            .request
            .clone()
            .ok_or_else(|| SwapError::Validation("Enter an amount to get a quote".to_string()))?;
        self.request_quote(request).await
    }

    /// Drop the current input, quote and error. In-flight results are discarded.
    pub fn clear(&self) {
        self.cancel_pending();
        let mut state = self.inner.state.write();
        state.seq += 1;
        state.request = None;
        state.quote = None;
        state.error = None;
        state.loading = false;
        self.inner.events.publish(SwapEvent::QuoteCleared);
    }

    pub fn quote(&self) -> Option<Arc<Quote>> {
        self.inner.state.read().quote.clone()
    }

    pub fn error(&self) -> Option<SwapError> {
        self.inner.state.read().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.read().loading
    }

    pub fn request(&self) -> Option<SwapRequest> {
        self.inner.state.read().request.clone()
    }

    pub fn snapshot(&self) -> QuoteSnapshot {
        let state = self.inner.state.read();
        QuoteSnapshot {
            request: state.request.clone(),
            quote: state.quote.clone(),
            error: state.error.clone(),
            loading: state.loading,
        }
    }

    fn cancel_pending(&self) {
        if let Some((_, handle)) = self.inner.pending.lock().take() {
            handle.abort();
        }
    }

    /// Issue a ticket for `request` and validate it.
    ///
    /// Changing the input invalidates the held quote. Blank or zero amounts
    /// clear state silently; other invalid input stores a validation error.
    fn begin(&self, request: SwapRequest) -> Result<(u64, u64), SwapError> {
        let mut state = self.inner.state.write();
        state.seq += 1;
        let ticket = state.seq;

        if state.request.as_ref() != Some(&request) {
            state.quote = None;
        }
        state.request = Some(request.clone());

        if let Err(e) = request.raw_amount() {
            if e.is_no_input() {
                state.quote = None;
                state.error = None;
                state.loading = false;
                self.inner.events.publish(SwapEvent::QuoteCleared);
                return Err(SwapError::from(e));
            }
        }

        match request.validate() {
            Ok(amount) => {
                state.error = None;
                Ok((ticket, amount))
            }
            Err(err) => {
                state.quote = None;
                state.error = Some(err.clone());
                state.loading = false;
                self.inner.events.publish(SwapEvent::QuoteFailed(err.clone()));
                Err(err)
            }
        }
    }

    async fn fetch(&self, ticket: u64, request: SwapRequest, amount: u64) -> Result<Arc<Quote>, SwapError> {
        {
            let mut state = self.inner.state.write();
            if state.seq != ticket {
                return Err(SwapError::Validation(
                    "Quote request was superseded by newer input".to_string(),
                ));
            }
            state.loading = true;
        }
        self.inner.events.publish(SwapEvent::QuoteLoading);

        debug!(
            input = request.input.symbol,
            output = request.output.symbol,
            amount,
            ticket,
            "requesting quote"
        );

        let result = self
            .inner
            .api
            .get_quote(
                request.input.mint,
                request.output.mint,
                amount,
                self.inner.settings.slippage_bps,
            )
            .await
            .map_err(|failure| failure.classify())
            .and_then(|response| Quote::from_response(request, amount, response))
            .map(Arc::new);

        let mut state = self.inner.state.write();
        if state.seq != ticket {
            debug!(ticket, latest = state.seq, "discarding superseded quote result");
            return result;
        }

        state.loading = false;
        match &result {
            Ok(quote) => {
                state.quote = Some(Arc::clone(quote));
                state.error = None;
                self.inner.events.publish(SwapEvent::QuoteUpdated {
                    out_amount_raw: quote.out_amount_raw,
                    price_impact: quote.price_impact,
                });
            }
            Err(err) => {
                warn!(kind = ?err.kind(), "quote failed: {}", err);
                state.quote = None;
                state.error = Some(err.clone());
                self.inner.events.publish(SwapEvent::QuoteFailed(err.clone()));
            }
        }
        result
    }
}
