//! Operator decisions
//!
//! The run asks a human twice: before anything is sent, and after a batch
//! fails with more batches left. Both questions go through [`Operator`] so the
//! controller can be driven without a console.

use dialoguer::Confirm;
use tracing::info;

use crate::error::{Error, Result};
use crate::run::state::RunPlan;

pub trait Operator {
    /// Go / no-go before the first transaction
    fn confirm_start(&mut self, plan: &RunPlan) -> Result<bool>;

    /// Continue / abort after `failed_batch` failed as a whole
    fn confirm_continue(&mut self, failed_batch: usize, reason: &str) -> Result<bool>;
}

/// Interactive y/n prompts on the terminal
pub struct ConsoleOperator {
    /// Skip the start prompt (`--yes`); failures still ask
    assume_yes: bool,
}

impl ConsoleOperator {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Operator for ConsoleOperator {
    fn confirm_start(&mut self, plan: &RunPlan) -> Result<bool> {
        if self.assume_yes {
            info!("Start confirmed via --yes");
            return Ok(true);
        }

        Confirm::new()
            .with_prompt(format!(
                "Send {} SOL to {} wallets in {} batches? This cannot be undone.",
                plan.total_sol(),
                plan.valid_count,
                plan.batches.len()
            ))
            .default(false)
            .interact()
            .map_err(|e| Error::Io(format!("Confirmation prompt failed: {}", e)))
    }

    fn confirm_continue(&mut self, failed_batch: usize, reason: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(format!(
                "Batch {} failed ({}). Continue with the remaining batches?",
                failed_batch, reason
            ))
            .default(false)
            .interact()
            .map_err(|e| Error::Io(format!("Confirmation prompt failed: {}", e)))
    }
}
