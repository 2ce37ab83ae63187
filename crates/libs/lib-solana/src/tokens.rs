//! # Token Registry
//!
//! Fixed per-network table of the tokens the swap engine supports.
//!
//! Identity of a token is the `(network, symbol)` pair; the same symbol maps to
//! different mints on different clusters.

use crate::Network;
use serde::Serialize;

/// Wrapped SOL mint, identical on every cluster.
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

pub const NATIVE_SYMBOL: &str = "SOL";

/// Static token metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TokenInfo {
    pub symbol: &'static str,
    pub mint: &'static str,
    pub decimals: u8,
    pub name: &'static str,
}

impl TokenInfo {
    /// Whether this is the network's native token (SOL, via the wrapped mint).
    pub fn is_native(&self) -> bool {
        self.mint == NATIVE_MINT
    }
}

const fn token(symbol: &'static str, mint: &'static str, decimals: u8, name: &'static str) -> TokenInfo {
    TokenInfo { symbol, mint, decimals, name }
}

static MAINNET_TOKENS: [TokenInfo; 7] = [
    token("SOL", NATIVE_MINT, 9, "Solana"),
    token("USDC", "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", 6, "USD Coin"),
    token("USDT", "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", 6, "Tether USD"),
    token("BONK", "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", 5, "Bonk"),
    token("WIF", "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm", 6, "dogwifhat"),
    token("JUP", "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN", 6, "Jupiter"),
    token("RAY", "4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R", 6, "Raydium"),
];

static DEVNET_TOKENS: [TokenInfo; 7] = [
    token("SOL", NATIVE_MINT, 9, "Solana (Devnet)"),
    token("USDC", "4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU", 6, "USD Coin (Devnet)"),
    token("USDT", "EJwZgeZrdC8TXTQbQBoL6bfuAnFUUy1PVCMB4DYPzVaS", 6, "Tether USD (Devnet)"),
    token("BONK", "AZsHEMXd36Bj1EMNXhowJajpUXzrKcK57wW4ZGXVa7yR", 5, "Bonk (Devnet)"),
    token("WIF", "Df6yfrKC8kZE3KNkrHERKzAetSxbrWeniQfyJY4Jpump", 6, "dogwifhat (Devnet)"),
    token("JUP", "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN", 6, "Jupiter (Devnet)"),
    token("RAY", "4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R", 6, "Raydium (Devnet)"),
];

static TESTNET_TOKENS: [TokenInfo; 7] = [
    token("SOL", NATIVE_MINT, 9, "Solana (Testnet)"),
    token("USDC", "CpMah17kQEL2wqyMKt3mZBdTnZbkbfx4nqmQMFDP5vwp", 6, "USD Coin (Testnet)"),
    token("USDT", "EJwZgeZrdC8TXTQbQBoL6bfuAnFUUy1PVCMB4DYPzVaS", 6, "Tether USD (Testnet)"),
    token("BONK", "AZsHEMXd36Bj1EMNXhowJajpUXzrKcK57wW4ZGXVa7yR", 5, "Bonk (Testnet)"),
    token("WIF", "Df6yfrKC8kZE3KNkrHERKzAetSxbrWeniQfyJY4Jpump", 6, "dogwifhat (Testnet)"),
    token("JUP", "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN", 6, "Jupiter (Testnet)"),
    token("RAY", "4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R", 6, "Raydium (Testnet)"),
];

/// All tokens for `network`, in selector order (SOL first).
pub fn tokens(network: Network) -> &'static [TokenInfo] {
    match network {
        Network::Mainnet => &MAINNET_TOKENS,
        Network::Devnet => &DEVNET_TOKENS,
        Network::Testnet => &TESTNET_TOKENS,
    }
}

/// Look up a token by symbol (case-insensitive).
pub fn get(network: Network, symbol: &str) -> Option<&'static TokenInfo> {
    tokens(network)
        .iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol.trim()))
}

pub fn symbols(network: Network) -> Vec<&'static str> {
    tokens(network).iter().map(|t| t.symbol).collect()
}

pub fn is_available(network: Network, symbol: &str) -> bool {
    get(network, symbol).is_some()
}

/// The network's native token.
pub fn native(network: Network) -> &'static TokenInfo {
    // SOL is always the first entry of every table.
    &tokens(network)[0]
}

/// First registry token whose symbol differs from `symbol`.
fn first_other(network: Network, symbol: &str) -> &'static TokenInfo {
    tokens(network)
        .iter()
        .find(|t| !t.symbol.eq_ignore_ascii_case(symbol))
        .unwrap_or_else(|| native(network))
}

// region:    --- Token Pair

/// Input/output token selection.
///
/// Selecting the token already on the other side flips that side to the first
/// other registry token, so the pair never becomes degenerate through selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub network: Network,
    pub input: &'static TokenInfo,
    pub output: &'static TokenInfo,
}

impl TokenPair {
    /// SOL → USDC on `network`.
    pub fn default_for(network: Network) -> Self {
        let input = native(network);
        let output = get(network, "USDC").unwrap_or_else(|| first_other(network, input.symbol));
        Self { network, input, output }
    }

    /// Build a pair from symbols. Unknown symbols yield `None`.
    pub fn from_symbols(network: Network, input: &str, output: &str) -> Option<Self> {
        Some(Self {
            network,
            input: get(network, input)?,
            output: get(network, output)?,
        })
    }

    /// Select the input token. Returns `false` for an unknown symbol.
    pub fn select_input(&mut self, symbol: &str) -> bool {
        let Some(token) = get(self.network, symbol) else {
            return false;
        };
        if token.symbol == self.output.symbol {
            self.output = first_other(self.network, token.symbol);
        }
        self.input = token;
        true
    }

    /// Select the output token. Returns `false` for an unknown symbol.
    pub fn select_output(&mut self, symbol: &str) -> bool {
        let Some(token) = get(self.network, symbol) else {
            return false;
        };
        if token.symbol == self.input.symbol {
            self.input = first_other(self.network, token.symbol);
        }
        self.output = token;
        true
    }

    /// Re-resolve both sides by symbol on another network.
    ///
    /// Falls back to the network's default pair if either symbol is missing.
    pub fn on_network(&self, network: Network) -> Self {
        Self::from_symbols(network, self.input.symbol, self.output.symbol)
            .unwrap_or_else(|| Self::default_for(network))
    }

    pub fn is_degenerate(&self) -> bool {
        self.input.symbol == self.output.symbol
    }
}

// endregion: --- Token Pair

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_network_has_seven_tokens() {
        for network in Network::ALL {
            assert_eq!(tokens(network).len(), 7);
            assert_eq!(
                symbols(network),
                vec!["SOL", "USDC", "USDT", "BONK", "WIF", "JUP", "RAY"]
            );
            assert!(native(network).is_native());
        }
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let usdc = get(Network::Mainnet, "usdc").unwrap();
        assert_eq!(usdc.mint, "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
        assert_eq!(usdc.decimals, 6);
        assert!(!usdc.is_native());
        assert!(get(Network::Mainnet, "DOGE").is_none());
        assert!(!is_available(Network::Devnet, "DOGE"));
    }

    #[test]
    fn test_mints_differ_per_network() {
        let main = get(Network::Mainnet, "USDC").unwrap();
        let dev = get(Network::Devnet, "USDC").unwrap();
        let test = get(Network::Testnet, "USDC").unwrap();
        assert_ne!(main.mint, dev.mint);
        assert_ne!(dev.mint, test.mint);
        assert_eq!(dev.name, "USD Coin (Devnet)");
        assert_eq!(get(Network::Devnet, "BONK").unwrap().decimals, 5);
    }

    #[test]
    fn test_select_input_flips_output() {
        let mut pair = TokenPair::default_for(Network::Mainnet);
        assert_eq!((pair.input.symbol, pair.output.symbol), ("SOL", "USDC"));

        assert!(pair.select_input("USDC"));
        assert_eq!(pair.input.symbol, "USDC");
        assert_eq!(pair.output.symbol, "SOL");
        assert!(!pair.is_degenerate());
    }

    #[test]
    fn test_select_output_flips_input() {
        let mut pair = TokenPair::default_for(Network::Devnet);
        assert!(pair.select_output("SOL"));
        assert_eq!(pair.output.symbol, "SOL");
        assert_eq!(pair.input.symbol, "USDC");
    }

    #[test]
    fn test_select_unknown_symbol_is_ignored() {
        let mut pair = TokenPair::default_for(Network::Mainnet);
        assert!(!pair.select_input("NOPE"));
        assert_eq!(pair, TokenPair::default_for(Network::Mainnet));
    }

    #[test]
    fn test_on_network_keeps_symbols() {
        let pair = TokenPair::from_symbols(Network::Mainnet, "JUP", "BONK").unwrap();
        let moved = pair.on_network(Network::Testnet);
        assert_eq!(moved.network, Network::Testnet);
        assert_eq!(moved.input.name, "Jupiter (Testnet)");
        assert_eq!(moved.output.symbol, "BONK");
    }
}
