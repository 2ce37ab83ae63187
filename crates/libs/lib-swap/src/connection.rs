//! # Endpoint-bound RPC Connection
//!
//! Couples the [`RpcEndpointSelector`] with a live [`RpcApi`] handle for the
//! current endpoint. Rotating the endpoint or switching network swaps the handle
//! atomically; callers that already hold the previous handle finish on it.

use crate::service::{RpcApi, RpcConnector};
use lib_core::Network;
use lib_solana::endpoints::{self, RpcEndpointSelector};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::info;

pub struct Connection {
    selector: Mutex<RpcEndpointSelector>,
    connector: Arc<dyn RpcConnector>,
    client: RwLock<Arc<dyn RpcApi>>,
}

impl Connection {
    pub fn new(selector: RpcEndpointSelector, connector: Arc<dyn RpcConnector>) -> Self {
        let client = connector.connect(selector.current());
        Self {
            selector: Mutex::new(selector),
            connector,
            client: RwLock::new(client),
        }
    }

    /// Handle for the current endpoint.
    pub fn client(&self) -> Arc<dyn RpcApi> {
        Arc::clone(&self.client.read())
    }

    pub fn endpoint(&self) -> String {
        self.selector.lock().current().to_string()
    }

    pub fn label(&self) -> &'static str {
        self.selector.lock().current_label()
    }

    pub fn network(&self) -> Network {
        self.selector.lock().network()
    }

    /// Rotate to the next endpoint of the current network. Returns the new URL.
    pub fn advance(&self) -> String {
        let mut selector = self.selector.lock();
        let url = selector.advance().to_string();
        self.reconnect(&url);
        info!(endpoint = %url, label = endpoints::label(&url), "switched RPC endpoint");
        url
    }

    /// Switch network, restarting at its first endpoint. Returns the new URL.
    pub fn set_network(&self, network: Network) -> String {
        let mut selector = self.selector.lock();
        let url = selector.set_network(network).to_string();
        self.reconnect(&url);
        info!(network = %network, endpoint = %url, "switched network");
        url
    }

    fn reconnect(&self, url: &str) {
        *self.client.write() = self.connector.connect(url);
    }
}
