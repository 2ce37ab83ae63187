//! # Failure Classification
//!
//! Maps raw collaborator failures onto the [`SwapError`] taxonomy.
//!
//! Collaborators report failures as a [`Failure`]: where it came from, an
//! optional HTTP status, the raw message and whether the request never reached
//! the server. [`classify`] is total: any input yields exactly one kind.

use crate::error::SwapError;
use serde::Serialize;
use std::fmt;

/// Which collaborator produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureOrigin {
    /// Quote request to the aggregator.
    QuoteService,
    /// Swap transaction build request to the aggregator.
    SwapBuilder,
    /// Read-only RPC call (balance, blockhash).
    Rpc,
    /// Raw transaction submission.
    Submission,
    /// Signature confirmation polling.
    Confirmation,
    /// Wallet / keypair signing.
    Signer,
}

impl fmt::Display for FailureOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureOrigin::QuoteService => "quote service",
            FailureOrigin::SwapBuilder => "swap builder",
            FailureOrigin::Rpc => "rpc",
            FailureOrigin::Submission => "submission",
            FailureOrigin::Confirmation => "confirmation",
            FailureOrigin::Signer => "signer",
        };
        f.write_str(name)
    }
}

/// Unclassified failure reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub origin: FailureOrigin,
    pub status: Option<u16>,
    pub message: String,
    /// The request failed before any response was received.
    pub transport: bool,
}

impl Failure {
    pub fn new(origin: FailureOrigin, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            origin,
            status: extract_status(&message),
            message,
            transport: false,
        }
    }

    pub fn with_status(origin: FailureOrigin, status: u16, message: impl Into<String>) -> Self {
        Self {
            origin,
            status: Some(status),
            message: message.into(),
            transport: false,
        }
    }

    pub fn transport(origin: FailureOrigin, message: impl Into<String>) -> Self {
        Self {
            origin,
            status: None,
            message: message.into(),
            transport: true,
        }
    }

    pub fn classify(&self) -> SwapError {
        classify(self)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} failure (status {}): {}", self.origin, status, self.message),
            None => write!(f, "{} failure: {}", self.origin, self.message),
        }
    }
}

impl std::error::Error for Failure {}

const EXPIRY_MARKERS: &[&str] = &["blockhash not found", "block height exceeded", "expired"];
const SIMULATION_MARKERS: &[&str] = &[
    "simulation failed",
    "insufficient funds",
    "insufficient lamports",
];
const RATE_LIMIT_MARKERS: &[&str] = &["too many requests", "403 forbidden", "rate limit"];
const NETWORK_MARKERS: &[&str] = &[
    "network request failed",
    "error sending request",
    "connection refused",
    "connection reset",
    "timed out",
    "dns error",
    "failed to fetch",
];
const NO_ROUTE_MARKERS: &[&str] = &["could not find any route", "no route"];

/// Classify a collaborator failure into exactly one [`SwapError`] kind.
///
/// Rules are evaluated in order; the first match wins.
pub fn classify(failure: &Failure) -> SwapError {
    let msg = failure.message.to_lowercase();
    let has = |markers: &[&str]| markers.iter().any(|m| msg.contains(m));
    let raw = failure.message.clone();

    if matches!(failure.status, Some(403) | Some(429)) {
        return SwapError::RateLimited(rate_limit_message(failure.status, raw));
    }

    if has(EXPIRY_MARKERS) {
        return SwapError::TransactionExpired(raw);
    }

    if has(SIMULATION_MARKERS) {
        return SwapError::SimulationFailed(raw);
    }

    if msg.contains("custom program error") {
        return match failure.origin {
            FailureOrigin::Confirmation => SwapError::OnChainExecution(raw),
            _ => SwapError::SimulationFailed(raw),
        };
    }

    // Bare digits are not enough: mints and signatures contain them.
    let status = extract_status(&failure.message);
    if matches!(status, Some(403) | Some(429)) || has(RATE_LIMIT_MARKERS) {
        return SwapError::RateLimited(rate_limit_message(status, raw));
    }

    if failure.transport || has(NETWORK_MARKERS) || matches!(failure.status, Some(500..=599)) {
        return SwapError::NetworkUnavailable(raw);
    }

    if failure.origin == FailureOrigin::QuoteService
        && (failure.status == Some(400) || has(NO_ROUTE_MARKERS))
    {
        return SwapError::Validation(raw);
    }

    if failure.origin == FailureOrigin::Confirmation && !msg.is_empty() {
        return SwapError::OnChainExecution(raw);
    }

    SwapError::Unknown(raw)
}

fn rate_limit_message(status: Option<u16>, raw: String) -> String {
    match status {
        Some(403) => format!("RPC rate limit exceeded (403): {}", raw),
        Some(429) => format!("Too many requests (429): {}", raw),
        _ => raw,
    }
}

/// Extract an HTTP status code from an error message.
///
/// Recognises `status 429`, `status: 429` and `(429 Too Many Requests)` forms.
pub fn extract_status(message: &str) -> Option<u16> {
    let lower = message.to_lowercase();

    if let Some(pos) = lower.find("status") {
        let rest = lower[pos + "status".len()..].trim_start_matches([' ', ':', '=']);
        if let Some(code) = leading_status(rest) {
            return Some(code);
        }
    }

    if let Some(pos) = lower.find('(') {
        if let Some(code) = leading_status(&lower[pos + 1..]) {
            return Some(code);
        }
    }

    None
}

fn leading_status(s: &str) -> Option<u16> {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() != 3 {
        return None;
    }
    digits.parse::<u16>().ok().filter(|code| (100..=599).contains(code))
}
