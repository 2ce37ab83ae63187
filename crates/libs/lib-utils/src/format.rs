//! # Formatting Utilities
//!
//! Display helpers for addresses and quote figures.

/// Truncate an address to `prefix_len` leading and `suffix_len` trailing characters.
///
/// Addresses too short to truncate meaningfully are returned unchanged.
pub fn format_address(address: &str, prefix_len: usize, suffix_len: usize) -> String {
    let address_len = address.len();

    if !address.is_ascii() || address_len <= prefix_len + suffix_len {
        return address.to_string();
    }

    // base58 is ASCII-only, so byte slicing is safe here
    format!("{}...{}", &address[..prefix_len], &address[address_len - suffix_len..])
}

/// Short form used for wallet addresses and transaction signatures (8 + 8 characters).
pub fn shorten_address(address: &str) -> String {
    format_address(address, 8, 8)
}

/// Format a price impact fraction (0.0012) as a percentage ("0.12%").
pub fn format_price_impact(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_address() {
        let addr = "8W6QginkhTTxoP2deQjq7rZ9YMwN5FH9JYuLfSKuJKAL";
        assert_eq!(format_address(addr, 4, 4), "8W6Q...JKAL");
        assert_eq!(shorten_address(addr), "8W6Qgink...fSKuJKAL");
        assert_eq!(format_address("abc", 4, 4), "abc");
    }

    #[test]
    fn test_format_price_impact() {
        assert_eq!(format_price_impact(0.0012), "0.12%");
        assert_eq!(format_price_impact(0.0), "0.00%");
    }
}
