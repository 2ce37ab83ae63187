//! # Swap Terminal
//!
//! `swap-terminal <INPUT> <OUTPUT> <AMOUNT> [--execute] [--json]`

use anyhow::{bail, Context};
use clap::Parser;
use lib_core::config::init_config;
use lib_swap::{SessionSnapshot, SwapSession};
use swap_terminal::{debug, render, Args};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    let args = Args::parse();

    debug::logger::init();

    let config = init_config().context("Invalid configuration")?;
    if args.is_same_token() {
        bail!("Input and output tokens cannot be the same");
    }

    let session = SwapSession::from_config(config)?;
    session.select_input(&args.input)?;
    session.select_output(&args.output)?;
    session.set_amount(args.amount.clone());

    let address = session.create_local_wallet().await?;
    info!(address = %address, "using ephemeral local wallet");

    if let Err(e) = session.quote_now().await {
        warn!(kind = ?e.kind(), "quote failed: {}", e);
    }
    print_snapshot(&session.snapshot(), args.json)?;

    if args.export_secret {
        if let Some(secret) = session.export_local_secret() {
            eprintln!("Local wallet secret key (hex), keep it private: {}", secret);
        }
    }

    if !args.execute {
        return Ok(());
    }
    if session.quote().is_none() {
        bail!("No quote available; not executing");
    }

    if !args.export_secret {
        eprintln!("The local wallet lives in memory only; without --export-secret its key is lost on exit.");
    }
    eprintln!(
        "Fund {} on {} with enough SOL for the swap plus fees, then press Enter.",
        address,
        session.network().display_name()
    );
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read from stdin")?;

    let balance = session.refresh_balance().await?;
    info!(balance = %balance.display(), "balance refreshed");
    session.refresh_quote().await?;

    match session.execute_swap().await {
        Ok(signature) => info!(signature = %signature, "swap finished"),
        Err(e) => warn!(kind = ?e.kind(), "swap failed: {}", e),
    }
    print_snapshot(&session.snapshot(), args.json)?;

    Ok(())
}

fn print_snapshot(snapshot: &SessionSnapshot, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        print!("{}", render::render_text(snapshot));
    }
    Ok(())
}
