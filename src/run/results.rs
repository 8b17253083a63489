//! Per-recipient result log
//!
//! One CSV row per recipient that was part of an attempted batch. Rows are
//! appended and flushed batch by batch so an interrupted run stays auditable.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use solana_sdk::signature::Signature;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Signature column value for recipients without a landed transaction
pub const NO_SIGNATURE: &str = "N/A";

const HEADER: [&str; 5] = [
    "wallet_address",
    "status",
    "transaction_signature",
    "timestamp",
    "batch_number",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Success,
    Failed,
}

/// One row of the result log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub wallet_address: String,
    pub status: TransferStatus,
    pub transaction_signature: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub batch_number: usize,
}

impl ResultRecord {
    pub fn success(
        wallet_address: &str,
        signature: &Signature,
        timestamp: DateTime<Utc>,
        batch_number: usize,
    ) -> Self {
        Self {
            wallet_address: wallet_address.to_string(),
            status: TransferStatus::Success,
            transaction_signature: signature.to_string(),
            timestamp,
            batch_number,
        }
    }

    pub fn failed(wallet_address: &str, timestamp: DateTime<Utc>, batch_number: usize) -> Self {
        Self {
            wallet_address: wallet_address.to_string(),
            status: TransferStatus::Failed,
            transaction_signature: NO_SIGNATURE.to_string(),
            timestamp,
            batch_number,
        }
    }
}

fn serialize_timestamp<S: Serializer>(
    ts: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Append-only destination for result records
pub trait ResultSink {
    /// Called once, after the operator confirmed the run
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    /// Append records; they must be durable when this returns
    fn append(&mut self, records: &[ResultRecord]) -> Result<()>;
}

impl ResultSink for Vec<ResultRecord> {
    fn append(&mut self, records: &[ResultRecord]) -> Result<()> {
        self.extend_from_slice(records);
        Ok(())
    }
}

/// CSV result log, created fresh for each run
pub struct CsvResultLog {
    path: PathBuf,
    writer: Option<csv::Writer<File>>,
    written: usize,
}

impl CsvResultLog {
    /// Nothing touches the filesystem until [`ResultSink::begin`]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records_written(&self) -> usize {
        self.written
    }

    fn writer(&mut self) -> Result<&mut csv::Writer<File>> {
        if self.writer.is_none() {
            self.begin()?;
        }
        self.writer
            .as_mut()
            .ok_or_else(|| Error::ResultLog("result log not open".into()))
    }
}

impl ResultSink for CsvResultLog {
    fn begin(&mut self) -> Result<()> {
        if self.writer.is_some() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(&self.path).map_err(|e| {
            Error::ResultLog(format!("Failed to create {}: {}", self.path.display(), e))
        })?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(HEADER)
            .map_err(|e| Error::ResultLog(e.to_string()))?;
        writer.flush()?;

        info!("Writing results to {}", self.path.display());
        self.writer = Some(writer);
        Ok(())
    }

    fn append(&mut self, records: &[ResultRecord]) -> Result<()> {
        let writer = self.writer()?;
        for record in records {
            writer
                .serialize(record)
                .map_err(|e| Error::ResultLog(e.to_string()))?;
        }
        writer.flush()?;

        self.written += records.len();
        debug!("Appended {} result records ({} total)", records.len(), self.written);
        Ok(())
    }
}
