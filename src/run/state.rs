//! Run plan, in-flight state and final report

use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};

use crate::transfer::batcher::{partition, Batch};
use crate::transfer::lamports_to_sol;
use crate::wallet::address::{self, InvalidAddress};

/// Everything decided before the first transaction is sent
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub batches: Vec<Batch>,
    pub recipient_count: usize,
    pub valid_count: usize,
    /// Entries that will be skipped, in input order
    pub invalid: Vec<InvalidAddress>,
    pub amount_lamports: u64,
    /// Sum of all transfers to valid recipients
    pub total_lamports: u64,
    /// `total_lamports` plus the fee margin
    pub required_lamports: u64,
}

impl RunPlan {
    pub fn new(
        recipients: Vec<String>,
        amount_lamports: u64,
        batch_size: NonZeroUsize,
        fee_margin_lamports: u64,
    ) -> Self {
        let invalid: Vec<InvalidAddress> = recipients
            .iter()
            .filter_map(|raw| address::validate(raw).err())
            .collect();
        let valid_count = recipients.len() - invalid.len();
        let total_lamports = amount_lamports.saturating_mul(valid_count as u64);

        Self {
            batches: partition(&recipients, batch_size),
            recipient_count: recipients.len(),
            valid_count,
            invalid,
            amount_lamports,
            total_lamports,
            required_lamports: total_lamports.saturating_add(fee_margin_lamports),
        }
    }

    pub fn total_sol(&self) -> f64 {
        lamports_to_sol(self.total_lamports)
    }

    pub fn required_sol(&self) -> f64 {
        lamports_to_sol(self.required_lamports)
    }
}

/// Mutable bookkeeping for one run; lives only as long as the process
#[derive(Debug, Clone, Default)]
pub struct RunState {
    pub successes: usize,
    pub failures: usize,
    pub batches_processed: usize,
    last_timestamp: Option<DateTime<Utc>>,
}

impl RunState {
    /// Wall-clock timestamp for the next record, never earlier than the last
    pub fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every batch was attempted
    Completed,
    /// Operator stopped after a failed batch; later batches were not sent
    Aborted { failed_batch: usize },
    /// Operator declined before anything was sent
    Declined,
}

/// Summary handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub status: RunStatus,
    pub successes: usize,
    pub failures: usize,
    pub batches_total: usize,
    pub batches_processed: usize,
    pub final_balance_lamports: Option<u64>,
}

impl RunReport {
    pub fn declined(batches_total: usize) -> Self {
        Self {
            status: RunStatus::Declined,
            successes: 0,
            failures: 0,
            batches_total,
            batches_processed: 0,
            final_balance_lamports: None,
        }
    }
}
