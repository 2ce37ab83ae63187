//! Plain text rendering of session snapshots

use lib_swap::SessionSnapshot;
use std::fmt::Write;

pub fn render_text(snap: &SessionSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Network:   {} ({} - {})", snap.network, snap.endpoint_label, snap.endpoint);

    match (&snap.address, &snap.identity) {
        (Some(address), Some(kind)) => {
            let _ = writeln!(out, "Wallet:    {} [{}]", address, kind);
        }
        _ => {
            let _ = writeln!(out, "Wallet:    not connected");
        }
    }
    let _ = writeln!(out, "Balance:   {} SOL", snap.balance_sol);

    let amount = if snap.amount.trim().is_empty() { "-" } else { snap.amount.trim() };
    let _ = writeln!(out, "Swap:      {} {} -> {}", amount, snap.input, snap.output);

    if snap.loading {
        let _ = writeln!(out, "Quote:     loading...");
    } else if let Some(quote) = &snap.quote {
        let _ = writeln!(out, "Receive:   {} {}", quote.receive_amount, quote.output_symbol);
        let _ = writeln!(
            out,
            "Impact:    {}  Route: {} hop(s)  Age: {}s{}",
            quote.price_impact,
            quote.route_hops,
            quote.age_secs,
            if quote.stale { " (stale, refresh recommended)" } else { "" }
        );
    }

    let _ = writeln!(out, "Status:    {}", snap.status_text);
    if let Some(signature) = &snap.signature {
        let _ = writeln!(out, "Signature: {}", signature);
    }
    if let Some(url) = &snap.explorer_url {
        let _ = writeln!(out, "Explorer:  {}", url);
    }
    if let Some(error) = &snap.last_error {
        let _ = writeln!(out, "Error:     {}", error.message);
        let _ = writeln!(out, "Hint:      {}", error.hint);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_core::ErrorKind;
    use lib_solana::wallet::IdentityKind;
    use lib_swap::{ErrorSummary, QuoteSummary, SwapStatus};

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            network: "Mainnet-Beta",
            endpoint: "https://api.mainnet-beta.solana.com".to_string(),
            endpoint_label: "Solana Labs",
            input: "SOL",
            output: "USDC",
            amount: "1.5".to_string(),
            address: Some("8W6QginkhTTxoP2deQjq7rZ9YMwN5FH9JYuLfSKuJKAL".to_string()),
            address_short: Some("8W6Qgink...fSKuJKAL".to_string()),
            identity: Some(IdentityKind::Local),
            balance_sol: "2.0000".to_string(),
            quote: Some(QuoteSummary {
                receive_amount: "150.000000".to_string(),
                output_symbol: "USDC",
                price_impact: "0.12%".to_string(),
                route_hops: 1,
                age_secs: 3,
                stale: false,
            }),
            loading: false,
            status: SwapStatus::Confirmed,
            status_text: SwapStatus::Confirmed.to_string(),
            signature: Some("abc123".to_string()),
            explorer_url: Some("https://explorer.solana.com/tx/abc123".to_string()),
            last_error: None,
        }
    }

    #[test]
    fn test_render_confirmed_swap() {
        let text = render_text(&snapshot());
        assert!(text.contains("Receive:   150.000000 USDC"));
        assert!(text.contains("Balance:   2.0000 SOL"));
        assert!(text.contains("Wallet:    8W6QginkhTTxoP2deQjq7rZ9YMwN5FH9JYuLfSKuJKAL [Local]"));
        assert!(text.contains("Explorer:  https://explorer.solana.com/tx/abc123"));
        assert!(!text.contains("Error:"));
    }

    #[test]
    fn test_render_error_and_stale_quote() {
        let mut snap = snapshot();
        snap.quote.as_mut().unwrap().stale = true;
        snap.last_error = Some(ErrorSummary {
            kind: ErrorKind::RateLimited,
            message: "Too many requests (429): slow down".to_string(),
            hint: "Switch RPC",
        });

        let text = render_text(&snap);
        assert!(text.contains("stale"));
        assert!(text.contains("Error:     Too many requests (429): slow down"));
        assert!(text.contains("Hint:      Switch RPC"));
    }
}
