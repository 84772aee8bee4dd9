//! couplectl: drive the couple pairing and sync core from a shell.
//!
//! Usage:
//!   couplectl --state a.db --remote shared/ --identity alice create
//!   couplectl --state b.db --remote shared/ --identity bob redeem ABCD-EFGH
//!
//! Each state file acts as one device; devices sharing a remote folder see
//! each other's writes.

use anyhow::Result;
use clap::Parser;
use couple_cli::Args;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let output = couple_cli::run(&args).await?;
    println!("{output}");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let builder = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    if std::env::var_os("RUST_LOG").is_some() {
        builder.with_env_filter(EnvFilter::from_default_env()).init();
    } else {
        let log_level = if verbose { Level::DEBUG } else { Level::WARN };
        builder.with_max_level(log_level).init();
    }
}
