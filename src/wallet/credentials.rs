//! Funding keypair loading
//!
//! Reads a Solana CLI keypair file (JSON array of 64 secret-key bytes).

use std::path::Path;

use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Load the funding keypair from disk
///
/// Refuses files readable by group or others on Unix.
pub fn load_keypair(path: &Path) -> Result<Keypair> {
    debug!("Loading keypair from: {:?}", path);

    if !path.exists() {
        return Err(Error::InvalidKeypair(format!(
            "Keypair file not found: {}",
            path.display()
        )));
    }

    // Validate permissions on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(path)?.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(Error::InsecureKeypair(format!(
                "Keypair file {} has insecure permissions {:o}. Run 'chmod 600 {}'",
                path.display(),
                mode & 0o777,
                path.display()
            )));
        }
    }

    let keypair_bytes = std::fs::read(path).map_err(|e| {
        Error::InvalidKeypair(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let secret: Vec<u8> = serde_json::from_slice(&keypair_bytes).map_err(|e| {
        Error::InvalidKeypair(format!(
            "Failed to parse keypair JSON in {}: {}",
            path.display(),
            e
        ))
    })?;

    let keypair = Keypair::from_bytes(&secret).map_err(|e| {
        Error::InvalidKeypair(format!("Invalid keypair bytes in {}: {}", path.display(), e))
    })?;

    info!("Loaded funding keypair: {}", keypair.pubkey());
    Ok(keypair)
}
