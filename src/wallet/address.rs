//! Recipient address validation
//!
//! A recipient is any base58 string that decodes to a 32-byte ed25519 public
//! key. Malformed entries are reported, never fatal.

use solana_sdk::pubkey::{Pubkey, PUBKEY_BYTES};
use std::fmt;

/// A recipient address that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecipientAddress(Pubkey);

impl RecipientAddress {
    pub fn pubkey(&self) -> &Pubkey {
        &self.0
    }
}

impl fmt::Display for RecipientAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Why an address was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    Empty,
    NotBase58(String),
    WrongLength(usize),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Empty => write!(f, "empty address"),
            InvalidReason::NotBase58(e) => write!(f, "not valid base58: {}", e),
            InvalidReason::WrongLength(len) => {
                write!(f, "decodes to {} bytes, expected {}", len, PUBKEY_BYTES)
            }
        }
    }
}

/// A rejected address with the offending input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAddress {
    pub raw: String,
    pub reason: InvalidReason,
}

impl fmt::Display for InvalidAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\": {}", self.raw, self.reason)
    }
}

/// Validate a raw recipient string
pub fn validate(raw: &str) -> Result<RecipientAddress, InvalidAddress> {
    let invalid = |reason| InvalidAddress {
        raw: raw.to_string(),
        reason,
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid(InvalidReason::Empty));
    }

    let bytes = bs58::decode(trimmed)
        .into_vec()
        .map_err(|e| invalid(InvalidReason::NotBase58(e.to_string())))?;

    let key: [u8; PUBKEY_BYTES] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| invalid(InvalidReason::WrongLength(bytes.len())))?;

    Ok(RecipientAddress(Pubkey::new_from_array(key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_address() {
        let pubkey = Pubkey::new_unique();
        let address = validate(&pubkey.to_string()).unwrap();
        assert_eq!(address.pubkey(), &pubkey);
        assert_eq!(address.to_string(), pubkey.to_string());
    }

    #[test]
    fn test_system_program_is_valid() {
        assert!(validate("11111111111111111111111111111111").is_ok());
    }

    #[test]
    fn test_surrounding_whitespace_tolerated() {
        let pubkey = Pubkey::new_unique();
        let address = validate(&format!("  {}\t", pubkey)).unwrap();
        assert_eq!(address.pubkey(), &pubkey);
    }

    #[test]
    fn test_empty_rejected() {
        let err = validate("   ").unwrap_err();
        assert_eq!(err.reason, InvalidReason::Empty);
        assert_eq!(err.raw, "   ");
    }

    #[test]
    fn test_non_base58_rejected() {
        // '0', 'O', 'I' and 'l' are not in the base58 alphabet
        let err = validate("0OIl0OIl").unwrap_err();
        assert!(matches!(err.reason, InvalidReason::NotBase58(_)));
        assert_eq!(err.raw, "0OIl0OIl");
    }

    #[test]
    fn test_wrong_length_rejected() {
        let short = bs58::encode([7u8; 31]).into_string();
        let err = validate(&short).unwrap_err();
        assert_eq!(err.reason, InvalidReason::WrongLength(31));

        let long = bs58::encode([7u8; 33]).into_string();
        assert_eq!(
            validate(&long).unwrap_err().reason,
            InvalidReason::WrongLength(33)
        );
    }
}
