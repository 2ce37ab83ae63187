//! Swap orchestration engine: quotes, balances, signing identities and the
//! build, sign, send, confirm pipeline behind a single [`SwapSession`].

// region: --- Modules
pub mod balance;
pub mod connection;
pub mod events;
pub mod keys;
pub mod orchestrator;
pub mod quote_engine;
pub mod request;
pub mod service;
pub mod session;

#[cfg(test)]
mod testing;
// endregion: --- Modules

pub use balance::{Balance, BalanceTracker};
pub use connection::Connection;
pub use events::{EventBus, SwapEvent};
pub use keys::KeyProvider;
pub use orchestrator::{SwapExecution, SwapOrchestrator, SwapSettings, SwapStatus};
pub use quote_engine::{Quote, QuoteEngine, QuoteSettings, QuoteSnapshot};
pub use request::SwapRequest;
pub use service::{BlockhashInfo, QuoteApi, RpcApi, RpcConnector, SolanaConnector};
pub use session::{ErrorSummary, QuoteSummary, SessionSnapshot, SwapSession};
