//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use std::fmt;
use std::path::{Path, PathBuf};

/// Largest number of system transfers that fit into one legacy transaction
/// (1232-byte packet: 166 bytes fixed overhead + 49 bytes per recipient).
pub const MAX_TRANSFERS_PER_TX: usize = 21;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Named network profile, each mapping to a public RPC endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NetworkProfile {
    Mainnet,
    Testnet,
    Devnet,
}

impl NetworkProfile {
    pub fn rpc_url(&self) -> &'static str {
        match self {
            NetworkProfile::Mainnet => "https://api.mainnet-beta.solana.com",
            NetworkProfile::Testnet => "https://api.testnet.solana.com",
            NetworkProfile::Devnet => "https://api.devnet.solana.com",
        }
    }
}

impl fmt::Display for NetworkProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkProfile::Mainnet => write!(f, "mainnet"),
            NetworkProfile::Testnet => write!(f, "testnet"),
            NetworkProfile::Devnet => write!(f, "devnet"),
        }
    }
}

/// Confirmation depth required before a batch counts as settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AssuranceLevel {
    /// Voted on by a supermajority of the cluster
    Confirmed,
    /// Rooted; cannot be rolled back
    Finalized,
}

impl AssuranceLevel {
    pub fn commitment(&self) -> CommitmentConfig {
        match self {
            AssuranceLevel::Confirmed => CommitmentConfig::confirmed(),
            AssuranceLevel::Finalized => CommitmentConfig::finalized(),
        }
    }

    pub fn level(&self) -> CommitmentLevel {
        self.commitment().commitment
    }
}

impl fmt::Display for AssuranceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssuranceLevel::Confirmed => write!(f, "confirmed"),
            AssuranceLevel::Finalized => write!(f, "finalized"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_profile")]
    pub profile: NetworkProfile,
    /// Explicit RPC URL; overrides the profile's public endpoint
    #[serde(default)]
    pub rpc_endpoint: Option<String>,
    #[serde(default = "default_commitment")]
    pub commitment: AssuranceLevel,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl NetworkConfig {
    /// RPC URL used for the run
    pub fn rpc_url(&self) -> String {
        self.rpc_endpoint
            .clone()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.profile.rpc_url().to_string())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            rpc_endpoint: None,
            commitment: default_commitment(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferConfig {
    /// SOL sent to each recipient
    #[serde(default = "default_amount_sol")]
    pub amount_sol: f64,
    /// Maximum recipients per transaction
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Extra SOL the funding wallet must hold on top of the transfers, for fees
    #[serde(default = "default_fee_margin_sol")]
    pub fee_margin_sol: f64,
    /// Pause between batches
    #[serde(default = "default_batch_interval_ms")]
    pub batch_interval_ms: u64,
    /// Re-check the funding balance every N batches
    #[serde(default = "default_balance_report_interval")]
    pub balance_report_interval: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            amount_sol: default_amount_sol(),
            batch_size: default_batch_size(),
            fee_margin_sol: default_fee_margin_sol(),
            batch_interval_ms: default_batch_interval_ms(),
            balance_report_interval: default_balance_report_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_keypair_path")]
    pub keypair: String,
    #[serde(default = "default_recipients_path")]
    pub recipients: String,
    /// Result log file; a timestamped file under `output_dir` when unset
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl PathsConfig {
    /// Result log location for a run started now
    pub fn result_log_path(&self) -> PathBuf {
        match &self.output {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => {
                let stamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ");
                Path::new(&self.output_dir).join(format!("distribution_results_{}.csv", stamp))
            }
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            keypair: default_keypair_path(),
            recipients: default_recipients_path(),
            output: None,
            output_dir: default_output_dir(),
        }
    }
}

// Default value functions
fn default_profile() -> NetworkProfile {
    NetworkProfile::Mainnet
}

fn default_commitment() -> AssuranceLevel {
    AssuranceLevel::Confirmed
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_amount_sol() -> f64 {
    0.001
}

fn default_batch_size() -> usize {
    20
}

fn default_fee_margin_sol() -> f64 {
    0.01
}

fn default_batch_interval_ms() -> u64 {
    5000
}

fn default_balance_report_interval() -> usize {
    5
}

fn default_keypair_path() -> String {
    std::env::var("KEYPAIR_PATH").unwrap_or_else(|_| "./wallet.json".into())
}

fn default_recipients_path() -> String {
    "./data/recipients.csv".into()
}

fn default_output_dir() -> String {
    "./logs".into()
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix BATCH_TRANSFER__)
            .add_source(
                config::Environment::with_prefix("BATCH_TRANSFER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.transfer.amount_sol.is_finite() || self.transfer.amount_sol <= 0.0 {
            anyhow::bail!("amount_sol must be positive");
        }

        if crate::transfer::sol_to_lamports(self.transfer.amount_sol) == 0 {
            anyhow::bail!(
                "amount_sol {} is below one lamport",
                self.transfer.amount_sol
            );
        }

        if self.transfer.batch_size == 0 || self.transfer.batch_size > MAX_TRANSFERS_PER_TX {
            anyhow::bail!(
                "batch_size must be between 1 and {}, got {}",
                MAX_TRANSFERS_PER_TX,
                self.transfer.batch_size
            );
        }

        if !self.transfer.fee_margin_sol.is_finite() || self.transfer.fee_margin_sol < 0.0 {
            anyhow::bail!("fee_margin_sol cannot be negative");
        }

        if self.transfer.balance_report_interval == 0 {
            anyhow::bail!("balance_report_interval must be at least 1");
        }

        if self.network.timeout_ms == 0 {
            anyhow::bail!("timeout_ms must be positive");
        }

        if self.transfer.batch_interval_ms == 0 {
            tracing::warn!("batch_interval_ms is 0 - public RPC endpoints may rate-limit the run");
        }

        Ok(())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  Network:
    profile: {}
    rpc_url: {}
    commitment: {}
    timeout: {}ms
  Transfer:
    amount: {} SOL per recipient
    batch_size: {}
    fee_margin: {} SOL
    batch_interval: {}ms
    balance_report_interval: every {} batches
  Paths:
    keypair: {}
    recipients: {}
    output: {}
"#,
            self.network.profile,
            mask_url(&self.network.rpc_url()),
            self.network.commitment,
            self.network.timeout_ms,
            self.transfer.amount_sol,
            self.transfer.batch_size,
            self.transfer.fee_margin_sol,
            self.transfer.batch_interval_ms,
            self.transfer.balance_report_interval,
            self.paths.keypair,
            self.paths.recipients,
            self.paths
                .output
                .clone()
                .unwrap_or_else(|| {
                    format!("{}/distribution_results_<timestamp>.csv", self.paths.output_dir)
                }),
        )
    }
}

/// Mask URL for display (hide API keys in query params)
fn mask_url(url: &str) -> String {
    if let Some(idx) = url.find('?') {
        format!("{}?***", &url[..idx])
    } else {
        url.to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            transfer: TransferConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}
