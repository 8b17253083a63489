//! Run controller
//!
//! Drives one distribution run:
//!
//! ```text
//! Init → Precheck → AwaitConfirmStart
//!      → (Submitting → Recording → Pausing)* → Done | Aborted
//! ```
//!
//! Batches go out strictly one at a time. Each transaction uses a fresh
//! blockhash with the funding account as fee payer, so overlapping batches
//! would race on the same account.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};
use tracing::{error, info, warn};

use crate::config::{AssuranceLevel, Config};
use crate::error::{Error, Result};
use crate::run::operator::Operator;
use crate::run::results::{ResultRecord, ResultSink};
use crate::run::state::{RunPlan, RunReport, RunState, RunStatus};
use crate::transfer::{
    lamports_to_sol, sol_to_lamports, Batch, BuildOutcome, Ledger, SubmissionEngine,
    SubmissionOutcome, TransferBuilder,
};
use crate::wallet::address::InvalidAddress;

/// Knobs for one run
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub amount_lamports: u64,
    pub batch_size: NonZeroUsize,
    pub fee_margin_lamports: u64,
    pub batch_interval: Duration,
    pub balance_report_interval: NonZeroUsize,
    pub assurance: AssuranceLevel,
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let batch_size = NonZeroUsize::new(config.transfer.batch_size)
            .ok_or_else(|| Error::Config("batch_size must be at least 1".into()))?;
        let balance_report_interval = NonZeroUsize::new(config.transfer.balance_report_interval)
            .ok_or_else(|| Error::Config("balance_report_interval must be at least 1".into()))?;

        Ok(Self {
            amount_lamports: sol_to_lamports(config.transfer.amount_sol),
            batch_size,
            fee_margin_lamports: sol_to_lamports(config.transfer.fee_margin_sol),
            batch_interval: Duration::from_millis(config.transfer.batch_interval_ms),
            balance_report_interval,
            assurance: config.network.commitment,
        })
    }
}

/// Outcome of one batch, as recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every address in the batch was paid
    Success { signature: Signature },
    /// The transaction landed; `skipped` addresses were left out of it
    PartialSkip {
        signature: Signature,
        skipped: Vec<InvalidAddress>,
    },
    /// Nothing in the batch was paid
    Failure { reason: String, ambiguous: bool },
}

pub struct RunController {
    ledger: Arc<dyn Ledger>,
    funder: Keypair,
    settings: RunSettings,
    builder: TransferBuilder,
    engine: SubmissionEngine,
}

impl RunController {
    pub fn new(ledger: Arc<dyn Ledger>, funder: Keypair, settings: RunSettings) -> Self {
        Self {
            builder: TransferBuilder::new(ledger.clone()),
            engine: SubmissionEngine::new(ledger.clone()),
            ledger,
            funder,
            settings,
        }
    }

    pub fn funder(&self) -> Pubkey {
        self.funder.pubkey()
    }

    /// Validate, batch and total up `recipients`
    pub fn plan(&self, recipients: Vec<String>) -> RunPlan {
        RunPlan::new(
            recipients,
            self.settings.amount_lamports,
            self.settings.batch_size,
            self.settings.fee_margin_lamports,
        )
    }

    /// Execute a full run
    ///
    /// Only startup failures (balance fetch, insufficient funds) and result
    /// log I/O errors come back as `Err`; batch failures end up in the report.
    pub async fn run(
        &self,
        recipients: Vec<String>,
        operator: &mut dyn Operator,
        sink: &mut dyn ResultSink,
    ) -> Result<RunReport> {
        // Init
        let plan = self.plan(recipients);
        info!(
            "{} recipients ({} valid, {} invalid), {} batches, {} SOL total",
            plan.recipient_count,
            plan.valid_count,
            plan.invalid.len(),
            plan.batches.len(),
            plan.total_sol()
        );

        if plan.batches.is_empty() {
            warn!("Recipient list is empty, nothing to send");
            return Ok(RunReport {
                status: RunStatus::Completed,
                successes: 0,
                failures: 0,
                batches_total: 0,
                batches_processed: 0,
                final_balance_lamports: None,
            });
        }

        // Precheck
        self.precheck(&plan).await?;
        let mut state = RunState::default();

        // AwaitConfirmStart
        if !operator.confirm_start(&plan)? {
            info!("Run declined by operator, no transactions sent");
            return Ok(RunReport::declined(plan.batches.len()));
        }
        sink.begin()?;

        let total = plan.batches.len();
        let mut status = RunStatus::Completed;

        info!("Starting distribution...");
        for (index, batch) in plan.batches.iter().enumerate() {
            if index > 0 && index % self.settings.balance_report_interval.get() == 0 {
                self.report_balance().await;
            }

            info!(
                "Processing batch {}/{} ({} wallets)",
                batch.number,
                total,
                batch.len()
            );

            // Submitting
            let outcome = self.process_batch(batch).await;

            // Recording
            let records = Self::records_for(batch, &outcome, &mut state);
            sink.append(&records)?;
            Self::tally(batch, &outcome, &mut state);
            state.batches_processed += 1;

            let remaining = index + 1 < total;

            if let BatchOutcome::Failure { reason, ambiguous } = &outcome {
                error!("Batch {} failed: {}", batch.number, reason);
                if *ambiguous {
                    warn!(
                        "Batch {} may have landed anyway; verify on-chain before resending",
                        batch.number
                    );
                }

                if remaining && !Self::ask_continue(operator, batch.number, reason) {
                    info!("Run aborted after batch {}", batch.number);
                    status = RunStatus::Aborted {
                        failed_batch: batch.number,
                    };
                    break;
                }
            }

            // Pausing
            if remaining && !self.settings.batch_interval.is_zero() {
                info!(
                    "Waiting {:.1}s before the next batch...",
                    self.settings.batch_interval.as_secs_f64()
                );
                tokio::time::sleep(self.settings.batch_interval).await;
            }
        }

        let final_balance = self.report_balance().await;

        info!(
            "Run finished: {} succeeded, {} failed, {}/{} batches processed",
            state.successes, state.failures, state.batches_processed, total
        );

        Ok(RunReport {
            status,
            successes: state.successes,
            failures: state.failures,
            batches_total: total,
            batches_processed: state.batches_processed,
            final_balance_lamports: final_balance,
        })
    }

    /// Fetch the funding balance and make sure it covers the plan
    async fn precheck(&self, plan: &RunPlan) -> Result<()> {
        let balance = self.ledger.balance(&self.funder.pubkey()).await?;
        info!("Funding balance: {} SOL", lamports_to_sol(balance));

        if balance < plan.required_lamports {
            error!(
                "Insufficient balance: need {} SOL (including {} SOL fee margin), have {} SOL",
                plan.required_sol(),
                lamports_to_sol(self.settings.fee_margin_lamports),
                lamports_to_sol(balance)
            );
            return Err(Error::InsufficientBalance {
                available: lamports_to_sol(balance),
                required: plan.required_sol(),
            });
        }

        Ok(())
    }

    /// A prompt that cannot be answered counts as "stop"
    fn ask_continue(operator: &mut dyn Operator, failed_batch: usize, reason: &str) -> bool {
        match operator.confirm_continue(failed_batch, reason) {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Could not ask whether to continue ({}), stopping the run", e);
                false
            }
        }
    }

    /// Build and submit one batch; never fails, only classifies
    async fn process_batch(&self, batch: &Batch) -> BatchOutcome {
        let funder = self.funder.pubkey();

        let (transaction, skipped) = match self
            .builder
            .build(&funder, batch, self.settings.amount_lamports)
            .await
        {
            Ok(BuildOutcome::Ready {
                transaction,
                skipped,
            }) => (transaction, skipped),
            Ok(BuildOutcome::Empty { .. }) => {
                return BatchOutcome::Failure {
                    reason: "no valid recipient addresses in batch".into(),
                    ambiguous: false,
                }
            }
            Err(e) => {
                return BatchOutcome::Failure {
                    reason: e.to_string(),
                    ambiguous: false,
                }
            }
        };

        match self
            .engine
            .submit(transaction, &self.funder, self.settings.assurance)
            .await
        {
            SubmissionOutcome::Success { signature } => {
                info!("Batch {} succeeded: {}", batch.number, signature);
                if skipped.is_empty() {
                    BatchOutcome::Success { signature }
                } else {
                    BatchOutcome::PartialSkip { signature, skipped }
                }
            }
            SubmissionOutcome::Failure { reason, ambiguous } => {
                BatchOutcome::Failure { reason, ambiguous }
            }
        }
    }

    /// One record per batch address, in batch order
    fn records_for(
        batch: &Batch,
        outcome: &BatchOutcome,
        state: &mut RunState,
    ) -> Vec<ResultRecord> {
        batch
            .addresses
            .iter()
            .map(|address| {
                let ts = state.next_timestamp();
                match outcome {
                    BatchOutcome::Success { signature } => {
                        ResultRecord::success(address, signature, ts, batch.number)
                    }
                    BatchOutcome::PartialSkip { signature, skipped } => {
                        if skipped.iter().any(|s| s.raw == *address) {
                            ResultRecord::failed(address, ts, batch.number)
                        } else {
                            ResultRecord::success(address, signature, ts, batch.number)
                        }
                    }
                    BatchOutcome::Failure { .. } => ResultRecord::failed(address, ts, batch.number),
                }
            })
            .collect()
    }

    fn tally(batch: &Batch, outcome: &BatchOutcome, state: &mut RunState) {
        match outcome {
            BatchOutcome::Success { .. } => state.successes += batch.len(),
            BatchOutcome::PartialSkip { skipped, .. } => {
                state.successes += batch.len() - skipped.len();
                state.failures += skipped.len();
            }
            BatchOutcome::Failure { .. } => state.failures += batch.len(),
        }
    }

    /// Log the current funding balance; fetch errors are not fatal here
    async fn report_balance(&self) -> Option<u64> {
        match self.ledger.balance(&self.funder.pubkey()).await {
            Ok(balance) => {
                info!("Funding balance: {} SOL", lamports_to_sol(balance));
                Some(balance)
            }
            Err(e) => {
                warn!("Balance check failed: {}", e);
                None
            }
        }
    }
}
