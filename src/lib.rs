//! Solana Batch Transfer Library
//!
//! Distributes SOL from one funding wallet to many recipients, several
//! transfers per transaction, with a per-recipient result log.

pub mod cli;
pub mod config;
pub mod error;
pub mod run;
pub mod transfer;
pub mod wallet;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
