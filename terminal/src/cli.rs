//! Command line arguments

use clap::Parser;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about = "Quote and execute a token swap on Solana through Jupiter", long_about = None)]
pub struct Args {
    /// Input token symbol (e.g. SOL)
    pub input: String,
    /// Output token symbol (e.g. USDC)
    pub output: String,
    /// Amount of the input token, as a decimal (e.g. 1.5)
    pub amount: String,
    /// Execute the swap after quoting, using a fresh local wallet
    #[arg(long)]
    pub execute: bool,
    /// Print snapshots as JSON instead of text
    #[arg(long)]
    pub json: bool,
    /// Print the local wallet's secret key (hex) so funds can be recovered
    #[arg(long)]
    pub export_secret: bool,
}

impl Args {
    pub fn is_same_token(&self) -> bool {
        self.input.eq_ignore_ascii_case(&self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positional_and_flags() {
        let args = Args::try_parse_from(["swap-terminal", "SOL", "USDC", "1.5", "--execute", "--json"]).unwrap();
        assert_eq!(args.input, "SOL");
        assert_eq!(args.output, "USDC");
        assert_eq!(args.amount, "1.5");
        assert!(args.execute);
        assert!(args.json);
        assert!(!args.export_secret);
    }

    #[test]
    fn test_missing_amount_is_an_error() {
        assert!(Args::try_parse_from(["swap-terminal", "SOL", "USDC"]).is_err());
    }

    #[test]
    fn test_same_token_ignores_case() {
        let args = Args::try_parse_from(["swap-terminal", "sol", "SOL", "1"]).unwrap();
        assert!(args.is_same_token());
    }
}
