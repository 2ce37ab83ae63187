//! # Key Provider
//!
//! Holds at most one active signing identity: an externally connected wallet
//! or an ephemeral local keypair. Connecting an external wallet destroys the
//! local keypair; the local keypair lives in memory only.

use lib_core::SwapError;
use lib_solana::wallet::{self, ExternalSigner, ExternalWallet, Identity};
use solana_sdk::{pubkey::Pubkey, signature::{Keypair, Signer}};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Default)]
pub struct KeyProvider {
    external: Option<ExternalWallet>,
    local: Option<Arc<Keypair>>,
}

impl KeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate an ephemeral local keypair.
    ///
    /// Refused while an external wallet is connected or a local one already exists.
    pub fn create_local(&mut self) -> Result<Pubkey, SwapError> {
        if self.external.is_some() {
            return Err(SwapError::Validation(
                "Disconnect the external wallet before creating a local wallet".to_string(),
            ));
        }
        if self.local.is_some() {
            return Err(SwapError::Validation("A local wallet already exists".to_string()));
        }

        let keypair = wallet::generate_keypair();
        let pubkey = keypair.pubkey();
        self.local = Some(Arc::new(keypair));
        info!(address = %pubkey, "created local wallet (in memory only)");
        Ok(pubkey)
    }

    /// Destroy the local keypair. Returns whether one existed.
    pub fn remove_local(&mut self) -> bool {
        let removed = self.local.take().is_some();
        if removed {
            info!("removed local wallet");
        }
        removed
    }

    /// Activate an external wallet, clearing any local keypair.
    pub fn connect_external(&mut self, signer: Arc<dyn ExternalSigner>) -> Result<Pubkey, SwapError> {
        if !signer.is_connected() {
            return Err(SwapError::Validation(format!("{} is not connected", signer.name())));
        }

        if self.local.take().is_some() {
            warn!("external wallet connected; local wallet cleared");
        }

        let wallet = ExternalWallet::new(signer);
        let pubkey = wallet.address;
        info!(address = %pubkey, wallet = wallet.signer.name(), "external wallet connected");
        self.external = Some(wallet);
        Ok(pubkey)
    }

    /// Disconnect the external wallet. Returns whether one was connected.
    pub fn disconnect_external(&mut self) -> bool {
        self.external.take().is_some()
    }

    /// The active identity, if any.
    pub fn active(&self) -> Option<Identity> {
        if let Some(wallet) = &self.external {
            return Some(Identity::External(wallet.clone()));
        }
        self.local.as_ref().map(|kp| Identity::Local(Arc::clone(kp)))
    }

    pub fn has_local(&self) -> bool {
        self.local.is_some()
    }

    pub fn has_external(&self) -> bool {
        self.external.is_some()
    }

    /// Local secret key as hex, for backup on explicit user request.
    pub fn export_local_secret(&self) -> Option<String> {
        self.local.as_deref().map(wallet::secret_hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSigner;
    use lib_solana::IdentityKind;

    #[test]
    fn test_create_local() {
        let mut keys = KeyProvider::new();
        assert!(keys.active().is_none());

        let pubkey = keys.create_local().unwrap();
        let identity = keys.active().unwrap();
        assert_eq!(identity.public_key(), pubkey);
        assert_eq!(identity.kind(), IdentityKind::Local);
        assert_eq!(keys.export_local_secret().unwrap().len(), 128);
    }

    #[test]
    fn test_second_local_is_refused() {
        let mut keys = KeyProvider::new();
        let first = keys.create_local().unwrap();
        assert!(keys.create_local().is_err());
        assert_eq!(keys.active().unwrap().public_key(), first);
    }

    #[test]
    fn test_external_clears_local() {
        let mut keys = KeyProvider::new();
        keys.create_local().unwrap();

        let signer = Arc::new(FakeSigner::new());
        let pubkey = keys.connect_external(signer).unwrap();

        assert!(!keys.has_local());
        assert!(keys.has_external());
        assert!(keys.export_local_secret().is_none());
        let identity = keys.active().unwrap();
        assert_eq!(identity.public_key(), pubkey);
        assert_eq!(identity.kind(), IdentityKind::External("Fake Wallet".to_string()));
    }

    #[test]
    fn test_local_refused_while_external_connected() {
        let mut keys = KeyProvider::new();
        keys.connect_external(Arc::new(FakeSigner::new())).unwrap();
        assert!(keys.create_local().is_err());
        assert!(!keys.has_local());
    }

    #[test]
    fn test_disconnected_signer_is_refused() {
        let mut keys = KeyProvider::new();
        keys.create_local().unwrap();
        let signer = Arc::new(FakeSigner::new());
        signer.set_connected(false);
        assert!(keys.connect_external(signer).is_err());
        assert!(keys.has_local());
    }

    #[test]
    fn test_disconnect_and_remove() {
        let mut keys = KeyProvider::new();
        keys.connect_external(Arc::new(FakeSigner::new())).unwrap();
        assert!(keys.disconnect_external());
        assert!(!keys.disconnect_external());
        keys.create_local().unwrap();
        assert!(keys.remove_local());
        assert!(keys.active().is_none());
    }
}
