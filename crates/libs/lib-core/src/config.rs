//! # Swap Engine Configuration
//!
//! Configuration is loaded from environment variables and validated on startup
//! to fail fast if misconfigured. Every value has a default, so an empty
//! environment yields a working mainnet setup.
//!
//! ## Global Config Access
//!
//! ```rust,no_run
//! use lib_core::config::{core_config, init_config};
//!
//! init_config().unwrap();
//! let config = core_config().unwrap();
//! println!("slippage: {} bps", config.slippage_bps);
//! ```
//!
//! Library components receive the values they need by argument, so only the
//! binary touches the global instance.

use crate::network::Network;
use lib_utils::envs::{self, get_env_opt, get_env_parse_or};
use lib_utils::parse_raw_amount;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_JUPITER_API_BASE: &str = "https://quote-api.jup.ag/v6";
pub const DEFAULT_SLIPPAGE_BPS: u16 = 50;
pub const DEFAULT_QUOTE_DEBOUNCE_MS: u64 = 800;
pub const DEFAULT_QUOTE_STALE_SECS: u64 = 30;
/// 0.01 SOL
pub const DEFAULT_FEE_RESERVE_LAMPORTS: u64 = 10_000_000;
pub const DEFAULT_BALANCE_REFRESH_DELAY_MS: u64 = 2_000;
pub const DEFAULT_SEND_MAX_RETRIES: usize = 2;
pub const DEFAULT_JUPITER_TIMEOUT_SECS: u64 = 10;

const NATIVE_DECIMALS: u8 = 9;

/// Swap engine configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Network selected at startup
    pub network: Network,

    /// Per-network replacements for the built-in RPC endpoint lists
    pub rpc_endpoint_overrides: HashMap<Network, Vec<String>>,

    /// Helius API key; adds a keyed mainnet endpoint in first position
    pub helius_api_key: Option<String>,

    /// Base URL of the Jupiter v6 quote/swap API
    pub jupiter_api_base: String,

    pub jupiter_timeout: Duration,

    /// Slippage tolerance in basis points (1..=10000)
    pub slippage_bps: u16,

    /// Input inactivity window before a quote is requested
    pub quote_debounce: Duration,

    /// Age after which a held quote is reported as stale (advisory only)
    pub quote_stale_after: Duration,

    /// Native balance that must remain available for transaction fees
    pub fee_reserve_lamports: u64,

    /// Delay before the automatic balance refresh after a confirmed swap
    pub balance_refresh_delay: Duration,

    /// Transport-level retries requested on transaction submission
    pub send_max_retries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            rpc_endpoint_overrides: HashMap::new(),
            helius_api_key: None,
            jupiter_api_base: DEFAULT_JUPITER_API_BASE.to_string(),
            jupiter_timeout: Duration::from_secs(DEFAULT_JUPITER_TIMEOUT_SECS),
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
            quote_debounce: Duration::from_millis(DEFAULT_QUOTE_DEBOUNCE_MS),
            quote_stale_after: Duration::from_secs(DEFAULT_QUOTE_STALE_SECS),
            fee_reserve_lamports: DEFAULT_FEE_RESERVE_LAMPORTS,
            balance_refresh_delay: Duration::from_millis(DEFAULT_BALANCE_REFRESH_DELAY_MS),
            send_max_retries: DEFAULT_SEND_MAX_RETRIES,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, Error> {
        let network = match get_env_opt("SOLANA_NETWORK") {
            Some(name) => name
                .parse::<Network>()
                .map_err(|e| Error::Invalid(format!("SOLANA_NETWORK: {}", e)))?,
            None => Network::Mainnet,
        };

        let mut rpc_endpoint_overrides = HashMap::new();
        for (net, var) in [
            (Network::Mainnet, "SOLANA_RPC_ENDPOINTS_MAINNET"),
            (Network::Devnet, "SOLANA_RPC_ENDPOINTS_DEVNET"),
            (Network::Testnet, "SOLANA_RPC_ENDPOINTS_TESTNET"),
        ] {
            if let Some(list) = get_env_opt(var) {
                rpc_endpoint_overrides.insert(net, parse_endpoint_list(&list));
            }
        }

        let fee_reserve_lamports = match get_env_opt("FEE_RESERVE_SOL") {
            Some(sol) => parse_raw_amount(&sol, NATIVE_DECIMALS)
                .map_err(|e| Error::Invalid(format!("FEE_RESERVE_SOL: {}", e)))?,
            None => DEFAULT_FEE_RESERVE_LAMPORTS,
        };

        Ok(Self {
            network,
            rpc_endpoint_overrides,
            helius_api_key: get_env_opt("HELIUS_API_KEY"),
            jupiter_api_base: get_env_opt("JUPITER_API_BASE")
                .unwrap_or_else(|| DEFAULT_JUPITER_API_BASE.to_string()),
            jupiter_timeout: Duration::from_secs(get_env_parse_or(
                "JUPITER_TIMEOUT_SECS",
                DEFAULT_JUPITER_TIMEOUT_SECS,
            )?),
            slippage_bps: get_env_parse_or("SWAP_SLIPPAGE_BPS", DEFAULT_SLIPPAGE_BPS)?,
            quote_debounce: Duration::from_millis(get_env_parse_or(
                "QUOTE_DEBOUNCE_MS",
                DEFAULT_QUOTE_DEBOUNCE_MS,
            )?),
            quote_stale_after: Duration::from_secs(get_env_parse_or(
                "QUOTE_STALE_SECS",
                DEFAULT_QUOTE_STALE_SECS,
            )?),
            fee_reserve_lamports,
            balance_refresh_delay: Duration::from_millis(get_env_parse_or(
                "BALANCE_REFRESH_DELAY_MS",
                DEFAULT_BALANCE_REFRESH_DELAY_MS,
            )?),
            send_max_retries: get_env_parse_or("SEND_MAX_RETRIES", DEFAULT_SEND_MAX_RETRIES)?,
        })
    }

    /// Validate configuration values against the engine's rules.
    pub fn validate(&self) -> Result<(), Error> {
        if self.slippage_bps == 0 || self.slippage_bps > 10_000 {
            return Err(Error::Invalid(
                "SWAP_SLIPPAGE_BPS must be between 1 and 10000".to_string(),
            ));
        }

        if self.fee_reserve_lamports == 0 {
            return Err(Error::Invalid("FEE_RESERVE_SOL must be greater than 0".to_string()));
        }

        if self.jupiter_timeout.is_zero() {
            return Err(Error::Invalid("JUPITER_TIMEOUT_SECS must be greater than 0".to_string()));
        }

        if !self.jupiter_api_base.starts_with("http://") && !self.jupiter_api_base.starts_with("https://") {
            return Err(Error::Invalid(format!(
                "JUPITER_API_BASE must be an http(s) URL, got '{}'",
                self.jupiter_api_base
            )));
        }

        for (network, endpoints) in &self.rpc_endpoint_overrides {
            if endpoints.is_empty() {
                return Err(Error::Invalid(format!(
                    "RPC endpoint override for {} is empty",
                    network
                )));
            }
        }

        Ok(())
    }

    /// Endpoint override for `network`, if configured.
    pub fn endpoint_override(&self, network: Network) -> Option<&[String]> {
        self.rpc_endpoint_overrides.get(&network).map(Vec::as_slice)
    }
}

/// Split a comma separated endpoint list, dropping blanks.
pub fn parse_endpoint_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Global configuration instance (initialized once at startup).
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Initialize the global configuration.
///
/// Call once at application startup.
///
/// # Errors
///
/// Returns an error if:
/// - Environment variables are invalid
/// - Configuration validation fails
/// - Config has already been initialized
pub fn init_config() -> Result<&'static Config, Error> {
    let config = Config::from_env()?;
    config.validate()?;

    CONFIG.set(config).map_err(|_| Error::AlreadyInitialized)?;
    let config = core_config()?;
    tracing::debug!(
        network = %config.network,
        slippage_bps = config.slippage_bps,
        "configuration loaded"
    );
    Ok(config)
}

/// Get a reference to the global configuration.
pub fn core_config() -> Result<&'static Config, Error> {
    CONFIG.get().ok_or(Error::NotInitialized)
}

// region:    --- Error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Env(#[from] envs::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("config has already been initialized")]
    AlreadyInitialized,
    #[error("config must be initialized with init_config() before use")]
    NotInitialized,
}
// endregion: --- Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fee_reserve_lamports, 10_000_000);
        assert_eq!(config.quote_debounce, Duration::from_millis(800));
        assert_eq!(config.slippage_bps, 50);
        assert_eq!(config.send_max_retries, 2);
    }

    #[test]
    fn test_validate_rejects_bad_slippage() {
        let config = Config {
            slippage_bps: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Invalid(_))));

        let config = Config {
            slippage_bps: 10_001,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_fee_reserve() {
        let config = Config {
            fee_reserve_lamports: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_override() {
        let mut config = Config::default();
        config.rpc_endpoint_overrides.insert(Network::Devnet, Vec::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_endpoint_list() {
        let list = parse_endpoint_list(" https://a.example ,, https://b.example,");
        assert_eq!(list, vec!["https://a.example", "https://b.example"]);
        assert!(parse_endpoint_list(" , ").is_empty());
    }
}
