//! Network access for the transfer run
//!
//! [`Ledger`] is the only way the core talks to the cluster: balance reads,
//! blockhash reads and transaction submission.

use std::time::Duration;

use async_trait::async_trait;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_client::rpc_request::RpcError;
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction};
use tracing::debug;

use crate::config::AssuranceLevel;
use crate::error::{Error, Result};

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Balance of an account in lamports
    async fn balance(&self, account: &Pubkey) -> Result<u64>;

    /// Recent blockhash to make a transaction valid and non-replayable
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Send a signed transaction and wait until it reaches `assurance`
    async fn send_and_confirm(
        &self,
        transaction: &Transaction,
        assurance: AssuranceLevel,
    ) -> Result<Signature>;
}

/// [`Ledger`] backed by a Solana JSON-RPC endpoint
pub struct RpcLedger {
    rpc_client: RpcClient,
}

impl RpcLedger {
    pub fn new(url: String, timeout: Duration, assurance: AssuranceLevel) -> Self {
        Self {
            rpc_client: RpcClient::new_with_timeout_and_commitment(
                url,
                timeout,
                assurance.commitment(),
            ),
        }
    }

    pub fn url(&self) -> String {
        self.rpc_client.url()
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn balance(&self, account: &Pubkey) -> Result<u64> {
        self.rpc_client
            .get_balance(account)
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get balance: {}", e)))
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        self.rpc_client
            .get_latest_blockhash()
            .await
            .map_err(|e| Error::TransactionBuild(format!("Failed to get blockhash: {}", e)))
    }

    async fn send_and_confirm(
        &self,
        transaction: &Transaction,
        assurance: AssuranceLevel,
    ) -> Result<Signature> {
        let config = RpcSendTransactionConfig {
            skip_preflight: false,
            preflight_commitment: Some(assurance.level()),
            ..RpcSendTransactionConfig::default()
        };

        debug!("Sending transaction with {} commitment", assurance);
        self.rpc_client
            .send_and_confirm_transaction_with_spinner_and_config(
                transaction,
                assurance.commitment(),
                config,
            )
            .await
            .map_err(classify_send_error)
    }
}

/// Split send failures into "definitely not executed" and "unknown"
fn classify_send_error(e: ClientError) -> Error {
    match e.kind() {
        // Preflight simulation or request validation failed; nothing was broadcast
        ClientErrorKind::RpcError(RpcError::RpcResponseError { .. }) => {
            Error::TransactionRejected(e.to_string())
        }
        // Landed and failed on-chain; no lamports moved
        ClientErrorKind::TransactionError(_) => Error::TransactionRejected(e.to_string()),
        ClientErrorKind::SigningError(_) => Error::Signing(e.to_string()),
        ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => {
            Error::RpcConnection(e.to_string())
        }
        _ => Error::ConfirmationUnknown(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_client::rpc_request::RpcResponseErrorData;
    use solana_sdk::{signer::SignerError, transaction::TransactionError};

    fn classify(kind: ClientErrorKind) -> Error {
        classify_send_error(ClientError::from(kind))
    }

    #[test]
    fn test_preflight_rejection_is_definite() {
        let err = classify(ClientErrorKind::RpcError(RpcError::RpcResponseError {
            code: -32002,
            message: "Transaction simulation failed: insufficient lamports".into(),
            data: RpcResponseErrorData::Empty,
        }));
        assert!(matches!(err, Error::TransactionRejected(_)));
        assert!(!err.is_ambiguous());
    }

    #[test]
    fn test_onchain_failure_is_definite() {
        let err = classify(ClientErrorKind::TransactionError(
            TransactionError::InsufficientFundsForFee,
        ));
        assert!(matches!(err, Error::TransactionRejected(_)));
        assert!(!err.is_ambiguous());
    }

    #[test]
    fn test_signing_failure_is_definite() {
        let err = classify(ClientErrorKind::SigningError(SignerError::Custom(
            "keypair mismatch".into(),
        )));
        assert!(matches!(err, Error::Signing(_)));
        assert!(!err.is_ambiguous());
    }

    #[test]
    fn test_transport_failure_is_ambiguous() {
        let err = classify(ClientErrorKind::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        )));
        assert!(matches!(err, Error::RpcConnection(_)));
        assert!(err.is_ambiguous());
    }

    #[test]
    fn test_confirmation_timeout_is_ambiguous() {
        let err = classify(ClientErrorKind::RpcError(RpcError::ForUser(
            "unable to confirm transaction. This can happen in situations such as \
             transaction expiration and insufficient fee-payer funds"
                .into(),
        )));
        assert!(matches!(err, Error::ConfirmationUnknown(_)));
        assert!(err.is_ambiguous());
    }
}
