//! # Swap Events
//!
//! Broadcast notifications for display layers. Publishing never blocks and
//! never fails; events are dropped when nobody is subscribed.

use crate::orchestrator::SwapStatus;
use lib_core::SwapError;
use tokio::sync::broadcast;

const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum SwapEvent {
    QuoteLoading,
    QuoteUpdated { out_amount_raw: u64, price_impact: f64 },
    QuoteCleared,
    QuoteFailed(SwapError),
    /// The quote about to be executed is older than the staleness threshold.
    QuoteStale { age_secs: u64 },
    BalanceUpdated { lamports: u64 },
    BalanceFailed(SwapError),
    IdentityChanged,
    EndpointChanged { url: String },
    StatusChanged { status: SwapStatus, signature: Option<String> },
}

/// Fan-out channel for [`SwapEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SwapEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUFFER);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SwapEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: SwapEvent) {
        // Err only means there are no receivers right now.
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
