//! Splitting the recipient list into per-transaction batches

use std::num::NonZeroUsize;

/// One group of recipients sent in a single transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 1-based position within the run
    pub number: usize,
    /// Raw recipient entries, in input order
    pub addresses: Vec<String>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Partition recipients into batches of `size`, preserving order
///
/// Every batch holds exactly `size` entries except possibly the last.
pub fn partition(addresses: &[String], size: NonZeroUsize) -> Vec<Batch> {
    addresses
        .chunks(size.get())
        .enumerate()
        .map(|(i, chunk)| Batch {
            number: i + 1,
            addresses: chunk.to_vec(),
        })
        .collect()
}
