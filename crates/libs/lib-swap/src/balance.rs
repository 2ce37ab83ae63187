//! # Balance Tracker
//!
//! Caches the active identity's native balance.
//!
//! A failed refresh keeps the last known value for the same identity and
//! surfaces the classified error next to it. Refreshes are ordered like quotes:
//! a result is applied only if no newer refresh started meanwhile.

use crate::connection::Connection;
use crate::events::{EventBus, SwapEvent};
use crate::keys::KeyProvider;
use chrono::{DateTime, Utc};
use lib_core::SwapError;
use lib_solana::wallet::Identity;
use lib_utils::{format_raw_amount, now_utc};
use parking_lot::{Mutex, RwLock};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const NATIVE_DECIMALS: u8 = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    /// Identity the balance belongs to; `None` when no identity is active.
    pub owner: Option<Pubkey>,
    pub lamports: u64,
    pub as_of: DateTime<Utc>,
}

impl Balance {
    pub fn zero(owner: Option<Pubkey>) -> Self {
        Self {
            owner,
            lamports: 0,
            as_of: now_utc(),
        }
    }

    /// SOL with four decimals, e.g. "2.0000".
    pub fn display(&self) -> String {
        format_raw_amount(self.lamports, NATIVE_DECIMALS, 4)
    }
}

struct BalanceState {
    generation: u64,
    balance: Balance,
    error: Option<SwapError>,
}

struct Inner {
    connection: Arc<Connection>,
    keys: Arc<RwLock<KeyProvider>>,
    events: EventBus,
    state: RwLock<BalanceState>,
    scheduled: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Clone)]
pub struct BalanceTracker {
    inner: Arc<Inner>,
}

impl BalanceTracker {
    pub fn new(connection: Arc<Connection>, keys: Arc<RwLock<KeyProvider>>, events: EventBus) -> Self {
        Self {
            inner: Arc::new(Inner {
                connection,
                keys,
                events,
                state: RwLock::new(BalanceState {
                    generation: 0,
                    balance: Balance::zero(None),
                    error: None,
                }),
                scheduled: Mutex::new(None),
            }),
        }
    }

    /// Refresh for the currently active identity.
    pub async fn refresh(&self) -> Result<Balance, SwapError> {
        let identity = self.inner.keys.read().active();
        self.refresh_for(identity.as_ref()).await
    }

    /// Refresh for `identity`; zero without a network call when there is none.
    pub async fn refresh_for(&self, identity: Option<&Identity>) -> Result<Balance, SwapError> {
        let generation = {
            let mut state = self.inner.state.write();
            state.generation += 1;
            state.generation
        };

        let Some(identity) = identity else {
            let zero = Balance::zero(None);
            let mut state = self.inner.state.write();
            if state.generation == generation {
                state.balance = zero.clone();
                state.error = None;
                self.inner.events.publish(SwapEvent::BalanceUpdated { lamports: 0 });
            }
            return Ok(zero);
        };

        let owner = identity.public_key();
        let client = self.inner.connection.client();
        debug!(address = %owner, endpoint = client.url(), "fetching balance");
        let result = client.get_balance(&owner).await;

        let mut state = self.inner.state.write();
        let current = state.generation == generation;
        match result {
            Ok(lamports) => {
                let balance = Balance {
                    owner: Some(owner),
                    lamports,
                    as_of: now_utc(),
                };
                if current {
                    state.balance = balance.clone();
                    state.error = None;
                    self.inner.events.publish(SwapEvent::BalanceUpdated { lamports });
                }
                Ok(balance)
            }
            Err(failure) => {
                let err = failure.classify();
                if current {
                    warn!(address = %owner, kind = ?err.kind(), "balance refresh failed: {}", err);
                    // A previous identity's balance is not a last-known value for this one.
                    if state.balance.owner != Some(owner) {
                        state.balance = Balance::zero(Some(owner));
                    }
                    state.error = Some(err.clone());
                    self.inner.events.publish(SwapEvent::BalanceFailed(err.clone()));
                }
                Err(err)
            }
        }
    }

    /// Refresh once after `delay`, replacing any refresh already scheduled.
    pub fn schedule_refresh(&self, delay: Duration) {
        let tracker = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tracker.refresh().await;
        });
        if let Some(previous) = self.inner.scheduled.lock().replace(handle) {
            previous.abort();
        }
    }

    pub fn balance(&self) -> Balance {
        self.inner.state.read().balance.clone()
    }

    pub fn error(&self) -> Option<SwapError> {
        self.inner.state.read().error.clone()
    }

    /// Known balance of `owner`, zero if the cached balance belongs to someone else.
    pub fn lamports_for(&self, owner: &Pubkey) -> u64 {
        let state = self.inner.state.read();
        if state.balance.owner.as_ref() == Some(owner) {
            state.balance.lamports
        } else {
            0
        }
    }
}
