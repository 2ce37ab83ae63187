//! # Token Amounts
//!
//! Conversion between user-entered decimal strings and raw integer amounts
//! (smallest unit: lamports for SOL, base units for SPL tokens).
//!
//! Parsing is exact: the decimal string is never routed through a float, and
//! fractional digits beyond the token's precision are truncated (floor).

/// Parse a decimal string ("1.5") into a raw amount for a token with `decimals`.
///
/// # Errors
///
/// - [`Error::Empty`] for blank input
/// - [`Error::NotPositive`] for zero, negative values, or values that truncate to zero
/// - [`Error::NotANumber`] for anything that is not a plain decimal number
/// - [`Error::TooLarge`] if the raw amount does not fit in a `u64`
pub fn parse_raw_amount(input: &str, decimals: u8) -> Result<u64, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::Empty);
    }

    if let Some(rest) = trimmed.strip_prefix('-') {
        return match split_decimal(rest) {
            Some(_) => Err(Error::NotPositive),
            None => Err(Error::NotANumber(trimmed.to_string())),
        };
    }

    let (whole, frac) = split_decimal(trimmed).ok_or_else(|| Error::NotANumber(trimmed.to_string()))?;

    let scale = 10u64.checked_pow(decimals as u32).ok_or(Error::TooLarge)?;
    let whole_value: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| Error::TooLarge)?
    };

    let kept = &frac[..frac.len().min(decimals as usize)];
    let mut frac_value: u64 = 0;
    for digit in kept.bytes() {
        frac_value = frac_value * 10 + u64::from(digit - b'0');
    }
    for _ in kept.len()..decimals as usize {
        frac_value *= 10;
    }

    let raw = whole_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or(Error::TooLarge)?;

    if raw == 0 {
        return Err(Error::NotPositive);
    }
    Ok(raw)
}

/// Split "12.34" into ("12", "34"); `None` if the text is not a plain decimal.
fn split_decimal(text: &str) -> Option<(&str, &str)> {
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if all_digits(whole) && all_digits(frac) {
        Some((whole, frac))
    } else {
        None
    }
}

/// Format a raw amount with exactly `precision` fractional digits, rounding half up.
///
/// `format_raw_amount(150_000_000, 6, 6)` is `"150.000000"`.
pub fn format_raw_amount(raw: u64, decimals: u8, precision: usize) -> String {
    let decimals = decimals as usize;
    let scaled: u128 = if precision >= decimals {
        u128::from(raw) * 10u128.pow((precision - decimals) as u32)
    } else {
        let divisor = 10u128.pow((decimals - precision) as u32);
        let quotient = u128::from(raw) / divisor;
        let remainder = u128::from(raw) % divisor;
        if remainder * 2 >= divisor {
            quotient + 1
        } else {
            quotient
        }
    };

    if precision == 0 {
        return scaled.to_string();
    }
    let unit = 10u128.pow(precision as u32);
    format!("{}.{:0width$}", scaled / unit, scaled % unit, width = precision)
}

// region:    --- Error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Amount is required")]
    Empty,
    #[error("Amount must be greater than 0")]
    NotPositive,
    #[error("Amount '{0}' is not a valid number")]
    NotANumber(String),
    #[error("Amount is too large")]
    TooLarge,
}

impl Error {
    /// Blank and non-positive input means "nothing to quote" rather than a user mistake.
    pub fn is_no_input(&self) -> bool {
        matches!(self, Error::Empty | Error::NotPositive)
    }
}
// endregion: --- Error
