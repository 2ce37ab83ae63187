//! # Wallet Primitives
//!
//! The two kinds of signing identity the swap engine can act as.
//!
//! ## Identity kinds
//! - **External**: a wallet living outside this process (browser extension,
//!   hardware wallet bridge). It exposes its public key and an asynchronous
//!   sign operation that may wait on the user indefinitely.
//! - **Local**: an ephemeral keypair generated in memory, never persisted.

use async_trait::async_trait;
use serde::Serialize;
use solana_sdk::{
    message::VersionedMessage,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::VersionedTransaction,
};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::Network;

/// Wallet errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    /// The user declined the signature request.
    #[error("User rejected the request: {0}")]
    Rejected(String),
    /// The external wallet is no longer connected.
    #[error("Wallet disconnected")]
    Disconnected,
    /// Transaction signing error
    #[error("Signing error: {0}")]
    SigningError(String),
    /// No usable signing capability for the active identity.
    #[error("No signing method available")]
    NoSigner,
}

/// Capability exposed by an externally connected wallet.
#[async_trait]
pub trait ExternalSigner: Send + Sync {
    /// Adapter name shown to the user, e.g. "Phantom".
    fn name(&self) -> &str;

    fn public_key(&self) -> Pubkey;

    fn is_connected(&self) -> bool;

    /// Sign `transaction`, returning the signed copy.
    async fn sign_transaction(
        &self,
        transaction: VersionedTransaction,
    ) -> Result<VersionedTransaction, WalletError>;
}

/// Connected external wallet: its address plus the signing capability.
#[derive(Clone)]
pub struct ExternalWallet {
    pub address: Pubkey,
    pub signer: Arc<dyn ExternalSigner>,
}

impl ExternalWallet {
    pub fn new(signer: Arc<dyn ExternalSigner>) -> Self {
        Self {
            address: signer.public_key(),
            signer,
        }
    }
}

impl fmt::Debug for ExternalWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalWallet")
            .field("name", &self.signer.name())
            .field("address", &self.address)
            .finish()
    }
}

/// Active signing identity.
#[derive(Clone)]
pub enum Identity {
    External(ExternalWallet),
    Local(Arc<Keypair>),
}

impl Identity {
    pub fn public_key(&self) -> Pubkey {
        match self {
            Identity::External(wallet) => wallet.address,
            Identity::Local(keypair) => keypair.pubkey(),
        }
    }

    pub fn kind(&self) -> IdentityKind {
        match self {
            Identity::External(wallet) => IdentityKind::External(wallet.signer.name().to_string()),
            Identity::Local(_) => IdentityKind::Local,
        }
    }

    /// Sign with whichever capability this identity carries.
    pub async fn sign(&self, transaction: VersionedTransaction) -> Result<VersionedTransaction, WalletError> {
        match self {
            Identity::External(wallet) => {
                if !wallet.signer.is_connected() {
                    return Err(WalletError::Disconnected);
                }
                wallet.signer.sign_transaction(transaction).await
            }
            Identity::Local(keypair) => sign_local(transaction.message, keypair),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::External(wallet) => f.debug_tuple("External").field(wallet).finish(),
            // Never print key material.
            Identity::Local(keypair) => f.debug_tuple("Local").field(&keypair.pubkey()).finish(),
        }
    }
}

/// Display form of the active identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "name")]
pub enum IdentityKind {
    External(String),
    Local,
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKind::External(name) => f.write_str(name),
            IdentityKind::Local => f.write_str("Local"),
        }
    }
}

/// Sign `message` in-process with `keypair`.
///
/// The keypair must be the message's only required signer.
pub fn sign_local(message: VersionedMessage, keypair: &Keypair) -> Result<VersionedTransaction, WalletError> {
    VersionedTransaction::try_new(message, &[keypair])
        .map_err(|e| WalletError::SigningError(e.to_string()))
}

/// Generate a fresh ephemeral keypair.
pub fn generate_keypair() -> Keypair {
    Keypair::new()
}

/// Secret key bytes as lowercase hex, for user backup.
pub fn secret_hex(keypair: &Keypair) -> String {
    hex::encode(keypair.to_bytes())
}

/// Explorer link for a transaction signature.
pub fn explorer_tx_url(signature: &str, network: Network) -> String {
    format!(
        "https://explorer.solana.com/tx/{}{}",
        signature,
        network.explorer_cluster_param()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{hash::Hash, message::Message};

    struct StaticSigner {
        keypair: Keypair,
        connected: bool,
    }

    #[async_trait]
    impl ExternalSigner for StaticSigner {
        fn name(&self) -> &str {
            "Phantom"
        }

        fn public_key(&self) -> Pubkey {
            self.keypair.pubkey()
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        async fn sign_transaction(
            &self,
            transaction: VersionedTransaction,
        ) -> Result<VersionedTransaction, WalletError> {
            sign_local(transaction.message, &self.keypair)
        }
    }

    fn unsigned_for(payer: &Pubkey) -> VersionedTransaction {
        let mut message = Message::new(&[], Some(payer));
        message.recent_blockhash = Hash::new_from_array([7u8; 32]);
        VersionedTransaction {
            signatures: vec![Default::default()],
            message: VersionedMessage::Legacy(message),
        }
    }

    #[tokio::test]
    async fn test_local_identity_signs() {
        let keypair = Arc::new(generate_keypair());
        let identity = Identity::Local(keypair.clone());
        assert_eq!(identity.kind(), IdentityKind::Local);

        let signed = identity.sign(unsigned_for(&keypair.pubkey())).await.unwrap();
        assert_eq!(signed.signatures.len(), 1);
        assert!(signed.verify_with_results().iter().all(|ok| *ok));
    }

    #[tokio::test]
    async fn test_local_identity_rejects_foreign_payer() {
        let identity = Identity::Local(Arc::new(generate_keypair()));
        let other = generate_keypair().pubkey();
        let err = identity.sign(unsigned_for(&other)).await.unwrap_err();
        assert!(matches!(err, WalletError::SigningError(_)));
    }

    #[tokio::test]
    async fn test_external_identity_uses_signer() {
        let signer = Arc::new(StaticSigner {
            keypair: generate_keypair(),
            connected: true,
        });
        let identity = Identity::External(ExternalWallet::new(signer.clone()));
        assert_eq!(identity.public_key(), signer.keypair.pubkey());
        assert_eq!(identity.kind(), IdentityKind::External("Phantom".to_string()));

        let signed = identity.sign(unsigned_for(&identity.public_key())).await.unwrap();
        assert!(signed.verify_with_results().iter().all(|ok| *ok));
    }

    #[tokio::test]
    async fn test_disconnected_external_signer() {
        let identity = Identity::External(ExternalWallet::new(Arc::new(StaticSigner {
            keypair: generate_keypair(),
            connected: false,
        })));
        let err = identity.sign(unsigned_for(&identity.public_key())).await.unwrap_err();
        assert_eq!(err, WalletError::Disconnected);
    }

    #[test]
    fn test_debug_hides_secret() {
        let keypair = Arc::new(generate_keypair());
        let secret = secret_hex(&keypair);
        assert_eq!(secret.len(), 128);
        let debug = format!("{:?}", Identity::Local(keypair));
        assert!(!debug.contains(&secret));
    }

    #[test]
    fn test_explorer_url() {
        assert_eq!(
            explorer_tx_url("abc123", Network::Mainnet),
            "https://explorer.solana.com/tx/abc123"
        );
        assert_eq!(
            explorer_tx_url("abc123", Network::Devnet),
            "https://explorer.solana.com/tx/abc123?cluster=devnet"
        );
    }
}
