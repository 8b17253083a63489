//! Solana Batch Transfer - send SOL to many wallets from one funding account
//!
//! # WARNING
//! - Transfers are irreversible. Check the recipient list with `check` first.
//! - Try the run on devnet before mainnet.
//! - A batch reported as "outcome unknown" may have landed. Verify it on-chain
//!   before sending to those wallets again.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::error;

// Use the library crate
use sol_batch_transfer::cli::commands;
use sol_batch_transfer::config::{AssuranceLevel, Config, NetworkProfile};

/// Solana Batch Transfer - distribute SOL in batched transactions
#[derive(Parser)]
#[command(name = "batch-transfer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "batch-transfer.toml")]
    config: String,

    /// Network profile
    #[arg(short, long, global = true, value_enum)]
    network: Option<NetworkProfile>,

    /// Custom RPC URL (overrides the network profile's endpoint)
    #[arg(long, global = true, env = "RPC_ENDPOINT")]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send SOL to every wallet in the recipient list
    Run {
        #[command(flatten)]
        transfer: TransferArgs,

        /// Skip the start confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Validate the recipient list and show the plan, without sending
    Check {
        #[command(flatten)]
        transfer: TransferArgs,
    },

    /// Show the funding wallet balance
    Balance {
        /// Funding keypair file
        #[arg(short, long)]
        keypair: Option<String>,
    },

    /// Show current configuration (secrets masked)
    Config,
}

#[derive(Args)]
struct TransferArgs {
    /// Funding keypair file (JSON byte array)
    #[arg(short, long)]
    keypair: Option<String>,

    /// Recipient CSV file
    #[arg(short, long)]
    recipients: Option<String>,

    /// Result log file
    #[arg(short, long)]
    output: Option<String>,

    /// SOL per recipient
    #[arg(short, long)]
    amount: Option<f64>,

    /// Maximum recipients per transaction
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Confirmation level to wait for
    #[arg(long, value_enum)]
    commitment: Option<AssuranceLevel>,
}

impl TransferArgs {
    fn apply(self, config: &mut Config) {
        if let Some(keypair) = self.keypair {
            config.paths.keypair = keypair;
        }
        if let Some(recipients) = self.recipients {
            config.paths.recipients = recipients;
        }
        if let Some(output) = self.output {
            config.paths.output = Some(output);
        }
        if let Some(amount) = self.amount {
            config.transfer.amount_sol = amount;
        }
        if let Some(batch_size) = self.batch_size {
            config.transfer.batch_size = batch_size;
        }
        if let Some(commitment) = self.commitment {
            config.network.commitment = commitment;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sol_batch_transfer=info".parse()?),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Some(network) = cli.network {
        config.network.profile = network;
    }
    if let Some(url) = cli.rpc_url {
        config.network.rpc_endpoint = Some(url);
    }

    let result = match cli.command {
        Commands::Run { transfer, yes } => {
            transfer.apply(&mut config);
            validated(&config);
            commands::run(&config, yes).await
        }
        Commands::Check { transfer } => {
            transfer.apply(&mut config);
            validated(&config);
            commands::check(&config).await
        }
        Commands::Balance { keypair } => {
            if let Some(keypair) = keypair {
                config.paths.keypair = keypair;
            }
            commands::balance(&config).await
        }
        Commands::Config => commands::show_config(&config).await,
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Re-validate after CLI overrides; exits on invalid settings
fn validated(config: &Config) {
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {:#}", e);
        std::process::exit(1);
    }
}
