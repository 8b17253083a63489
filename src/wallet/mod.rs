//! Funding wallet and recipient handling
//!
//! - Credential loading for the funding keypair
//! - Recipient list parsing (CSV)
//! - Recipient address validation

pub mod address;
pub mod credentials;
pub mod recipients;

pub use address::{validate, InvalidAddress, InvalidReason, RecipientAddress};
pub use credentials::load_keypair;
pub use recipients::load_recipients;
