//! Distribution run orchestration
//!
//! # Architecture
//!
//! ```text
//!            Operator (y/n)
//!                 ↓
//! RunPlan → RunController → ResultSink (CSV)
//!                 ↓
//!      TransferBuilder → SubmissionEngine
//! ```

pub mod controller;
pub mod operator;
pub mod results;
pub mod state;

pub use controller::{BatchOutcome, RunController, RunSettings};
pub use operator::{ConsoleOperator, Operator};
pub use results::{CsvResultLog, ResultRecord, ResultSink, TransferStatus, NO_SIGNATURE};
pub use state::{RunPlan, RunReport, RunState, RunStatus};
