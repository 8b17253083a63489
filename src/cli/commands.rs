//! CLI command implementations

use anyhow::{Context, Result};
use solana_sdk::{pubkey::Pubkey, signer::Signer};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::run::{
    ConsoleOperator, CsvResultLog, RunController, RunPlan, RunSettings, RunStatus,
};
use crate::transfer::{lamports_to_sol, Ledger, RpcLedger};
use crate::wallet::{load_keypair, load_recipients};

fn rpc_ledger(config: &Config) -> RpcLedger {
    RpcLedger::new(
        config.network.rpc_url(),
        Duration::from_millis(config.network.timeout_ms),
        config.network.commitment,
    )
}

/// Distribute SOL to every recipient in the list
pub async fn run(config: &Config, assume_yes: bool) -> Result<()> {
    println!("\n=== SOLANA BATCH TRANSFER ===\n");
    println!("Network: {}", config.network.profile);
    println!("RPC URL: {}", config.network.rpc_url());
    println!("Keypair: {}", config.paths.keypair);
    println!("Recipients: {}", config.paths.recipients);
    println!("Batch size: {} addresses/transaction", config.transfer.batch_size);
    println!("Amount: {} SOL/wallet", config.transfer.amount_sol);
    println!("Commitment: {}", config.network.commitment);

    let keypair = load_keypair(Path::new(&config.paths.keypair))
        .context("Failed to load funding keypair")?;
    println!("\nFunding address: {}", keypair.pubkey());

    let recipients = load_recipients(Path::new(&config.paths.recipients))
        .context("Failed to load recipient list")?;

    info!("Connecting to {}...", config.network.rpc_url());
    let ledger: Arc<dyn Ledger> = Arc::new(rpc_ledger(config));
    show_funding_balance(ledger.as_ref(), &keypair.pubkey()).await;

    let settings = RunSettings::from_config(config)?;
    let controller = RunController::new(ledger, keypair, settings);

    let plan = controller.plan(recipients.clone());
    print_plan(&plan);

    let mut operator = ConsoleOperator::new(assume_yes);
    let mut results = CsvResultLog::new(config.paths.result_log_path());

    let report = match controller.run(recipients, &mut operator, &mut results).await {
        Ok(report) => report,
        Err(e) if e.is_safety_violation() => {
            println!("\nRun refused: {}. No transactions were sent.", e);
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    match report.status {
        RunStatus::Declined => {
            println!("\nCancelled. No transactions were sent.");
            return Ok(());
        }
        RunStatus::Aborted { failed_batch } => {
            println!(
                "\n=== ABORTED after batch {} ({}/{} batches processed) ===",
                failed_batch, report.batches_processed, report.batches_total
            );
        }
        RunStatus::Completed => println!("\n=== COMPLETE ==="),
    }

    println!("Succeeded: {} wallets", report.successes);
    println!("Failed: {} wallets", report.failures);
    if results.records_written() > 0 {
        println!("Results saved to {}", results.path().display());
    }
    match report.final_balance_lamports {
        Some(lamports) => println!("Final balance: {} SOL", lamports_to_sol(lamports)),
        None => println!("Final balance: (unavailable)"),
    }

    Ok(())
}

/// Validate the recipient list and show what a run would do, without sending
pub async fn check(config: &Config) -> Result<()> {
    let recipients = load_recipients(Path::new(&config.paths.recipients))
        .context("Failed to load recipient list")?;
    let settings = RunSettings::from_config(config)?;

    let plan = RunPlan::new(
        recipients,
        settings.amount_lamports,
        settings.batch_size,
        settings.fee_margin_lamports,
    );
    print_plan(&plan);

    if !plan.invalid.is_empty() {
        println!("\n=== INVALID ENTRIES ({}) ===\n", plan.invalid.len());
        for invalid in &plan.invalid {
            println!("  {}", invalid);
        }
        warn!(
            "{} entries will be recorded as failed without being sent",
            plan.invalid.len()
        );
    }

    println!();
    Ok(())
}

/// Show the funding wallet address and balance
pub async fn balance(config: &Config) -> Result<()> {
    let keypair = load_keypair(Path::new(&config.paths.keypair))
        .context("Failed to load funding keypair")?;
    let ledger = rpc_ledger(config);

    let lamports = ledger
        .balance(&keypair.pubkey())
        .await
        .context("Failed to fetch balance")?;

    println!("\n=== FUNDING WALLET ===\n");
    println!("Network: {} ({})", config.network.profile, ledger.url());
    println!("Address: {}", keypair.pubkey());
    println!("Balance: {} SOL", lamports_to_sol(lamports));
    println!();
    Ok(())
}

/// Show current configuration (secrets masked)
pub async fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

/// Print the starting balance; the run's precheck decides what a failure means
async fn show_funding_balance(ledger: &dyn Ledger, funder: &Pubkey) -> Option<u64> {
    match ledger.balance(funder).await {
        Ok(lamports) => {
            println!("Funding balance: {} SOL", lamports_to_sol(lamports));
            Some(lamports)
        }
        Err(e) => {
            warn!("Balance check failed: {}", e);
            None
        }
    }
}

fn print_plan(plan: &RunPlan) {
    println!("\n=== PLAN ===\n");
    println!("Recipients: {}", plan.recipient_count);
    println!("  valid: {}", plan.valid_count);
    println!("  invalid (will be skipped): {}", plan.invalid.len());
    println!("Batches: {}", plan.batches.len());
    println!("Amount per wallet: {} SOL", lamports_to_sol(plan.amount_lamports));
    println!("Total to send: {} SOL", plan.total_sol());
    println!("Required balance (incl. fee margin): {} SOL", plan.required_sol());
}
