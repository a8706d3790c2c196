//! Spinguard CLI - identity tokens, carrier assets and claim ledger operations.

use clap::{Parser, Subcommand};
use spinguard_core::SpinguardConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{canonicalize, carrier, claim, encode, extract, get, hash, list, lookup};

#[derive(Parser)]
#[command(name = "spinguard")]
#[command(about = "Spinguard fingerprint identity, token carrier and claim ledger CLI")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the canonical form of a raw fingerprint
    Canonicalize {
        /// Raw fingerprint JSON file (or stdin if not provided)
        input: Option<String>,
    },
    /// Compute the identity token of a raw fingerprint
    Hash {
        /// Raw fingerprint JSON file (or stdin if not provided)
        input: Option<String>,
    },
    /// Encode a raw fingerprint as a carrier request parameter
    Encode {
        /// Raw fingerprint JSON file (or stdin if not provided)
        input: Option<String>,
    },
    /// Issue a carrier asset
    Carrier {
        /// Encoded fingerprint parameter
        #[arg(long)]
        param: Option<String>,
        /// Write the asset here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Extract the identity marker from a carrier asset
    Extract {
        /// Carrier asset file
        asset: PathBuf,
    },
    /// Submit a claim against a ledger
    Claim {
        /// Ledger journal (defaults to ledger.path from the config)
        #[arg(long)]
        ledger: Option<PathBuf>,
        /// Claimant name
        #[arg(long)]
        name: String,
        /// Raw fingerprint JSON file
        #[arg(long)]
        fingerprint: Option<PathBuf>,
        /// Asserted identity token
        #[arg(long)]
        token: Option<String>,
    },
    /// Recognise a returning visitor from their identity cookie value
    Lookup {
        /// Ledger journal (defaults to ledger.path from the config)
        #[arg(long)]
        ledger: Option<PathBuf>,
        /// Value of the identity cookie
        cookie: String,
    },
    /// List ledger entries, newest first
    List {
        /// Ledger journal
        ledger: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Stop after N entries (default: unlimited)
        #[arg(long)]
        max_entries: Option<usize>,
    },
    /// Show the ledger entry for a token
    Get {
        /// Ledger journal
        ledger: PathBuf,
        /// Identity token
        token: String,
    },
}

fn init_tracing(config: &SpinguardConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let config = match SpinguardConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config);
    config.warn_on_defaults();

    let result = match cli.command {
        Commands::Canonicalize { input } => canonicalize::run(input),
        Commands::Hash { input } => hash::run(&config, input),
        Commands::Encode { input } => encode::run(&config, input),
        Commands::Carrier { param, out } => carrier::run(&config, param, out),
        Commands::Extract { asset } => extract::run(asset),
        Commands::Claim {
            ledger,
            name,
            fingerprint,
            token,
        } => claim::run(&config, ledger, name, fingerprint, token),
        Commands::Lookup { ledger, cookie } => lookup::run(&config, ledger, cookie),
        Commands::List {
            ledger,
            json,
            max_entries,
        } => list::run(&config, ledger, json, max_entries),
        Commands::Get { ledger, token } => get::run(&config, ledger, token),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
