//! RomanPie CLI - Session inspection and refresh tools.
//!
//! # Usage
//!
//! ```bash
//! # Run the full token lifecycle and print the resulting session
//! rp-cli session ensure
//!
//! # Print the stored token and cart without touching the network
//! rp-cli session show
//!
//! # Clear the stored token, cookie, and cart cache
//! rp-cli session reset
//! ```
//!
//! # Environment Variables
//!
//! - `RP_N8N_BASE` - Webhook backend base URL (required)
//! - `RP_SALEOR_CHANNEL` - Sales channel for checkout creation
//! - `RP_DEBUG` - Verbose lifecycle logging when `true`/`1`
//! - `RP_CONFIG_OVERRIDES` - JSON override object (highest precedence)
//!
//! Session state lives under `--state-dir` (default `.romanpie`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rp-cli")]
#[command(author, version, about = "RomanPie CLI tools")]
struct Cli {
    /// Directory holding the session state files.
    #[arg(long, default_value = ".romanpie")]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the checkout session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Run the full lifecycle: validate the stored token, create if needed
    Ensure,
    /// Print the stored token and cart without touching the network
    Show,
    /// Clear the stored token, cookie, and cart cache
    Reset,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Session { action } => match action {
            SessionAction::Ensure => commands::session::ensure(&cli.state_dir).await?,
            SessionAction::Show => commands::session::show(&cli.state_dir)?,
            SessionAction::Reset => commands::session::reset(&cli.state_dir)?,
        },
    }
    Ok(())
}
