//! # Time Utilities
//!
//! Utilities for time formatting using chrono.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Get current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Format an elapsed duration the way the quote panel shows it ("4s ago", "2m 5s ago").
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else {
        format!("{}m {}s ago", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::from_millis(4_900)), "4s ago");
        assert_eq!(format_age(Duration::from_secs(125)), "2m 5s ago");
    }
}
