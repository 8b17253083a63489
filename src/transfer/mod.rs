//! Batched SOL transfer pipeline
//!
//! ```text
//! recipients → partition → TransferBuilder → SubmissionEngine → outcome
//!                                  ↘               ↙
//!                                    Ledger (RPC)
//! ```

pub mod amount;
pub mod batcher;
pub mod builder;
pub mod ledger;
pub mod submission;

pub use amount::{lamports_to_sol, sol_to_lamports};
pub use batcher::{partition, Batch};
pub use builder::{BuildOutcome, TransferBuilder, TransferTransaction};
pub use ledger::{Ledger, RpcLedger};
pub use submission::{SubmissionEngine, SubmissionOutcome};
