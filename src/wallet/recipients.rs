//! Recipient list loading
//!
//! Reads wallet addresses from a CSV file with a header row. The address
//! column is `wallet_address`, then `address`, then whatever comes first.

use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Header names recognised as the address column, in priority order
const ADDRESS_COLUMNS: [&str; 2] = ["wallet_address", "address"];

/// Load raw recipient entries from a CSV file
pub fn load_recipients(path: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(path).map_err(|e| {
        Error::RecipientList(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let recipients = read_recipients(file)?;
    info!(
        "Loaded {} recipient addresses from {}",
        recipients.len(),
        path.display()
    );
    Ok(recipients)
}

/// Read raw recipient entries from CSV data, in file order
///
/// Blank entries are dropped; nothing else is validated here.
pub fn read_recipients<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| Error::RecipientList(format!("Failed to read CSV header: {}", e)))?
        .clone();

    let column = ADDRESS_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|h| h == *name))
        .unwrap_or(0);
    debug!(
        "Using column {} ({:?}) for recipient addresses",
        column,
        headers.get(column)
    );

    let mut recipients = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| {
            Error::RecipientList(format!("Malformed CSV row {}: {}", line + 2, e))
        })?;

        if let Some(value) = record.get(column) {
            let value = value.trim();
            if !value.is_empty() {
                recipients.push(value.to_string());
            }
        }
    }

    Ok(recipients)
}
