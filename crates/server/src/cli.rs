//! Command-line interface.

use clap::{Parser, Subcommand};

/// Exploit-alert risk scoring service.
#[derive(Parser, Debug)]
#[command(name = "exguard", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP service (default).
    Serve {
        /// Override HOST.
        #[arg(long)]
        host: Option<String>,
        /// Override PORT.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Score one alert and print the result as JSON.
    Evaluate {
        #[arg(long)]
        chain_id: u64,
        /// Victim address.
        #[arg(long)]
        attacked: String,
        #[arg(long)]
        exploiter: String,
        #[arg(long)]
        tx_hash: String,
    },
}
