//! Transaction submission
//!
//! Signs a built transfer, sends it and waits for the requested commitment.
//! Never retries: a failed or unknown outcome is handed back to the caller.

use std::sync::Arc;
use std::time::Instant;

use solana_sdk::signature::{Keypair, Signature};
use tracing::{debug, info, warn};

use crate::config::AssuranceLevel;
use crate::transfer::amount::lamports_to_sol;
use crate::transfer::builder::TransferTransaction;
use crate::transfer::ledger::Ledger;

/// Outcome of one submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success {
        signature: Signature,
    },
    Failure {
        reason: String,
        /// The transaction may still have landed; resubmitting could double-send
        ambiguous: bool,
    },
}

/// Sends built transactions to the cluster
pub struct SubmissionEngine {
    ledger: Arc<dyn Ledger>,
}

impl SubmissionEngine {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// Sign, send and confirm `transaction`
    pub async fn submit(
        &self,
        transaction: TransferTransaction,
        signer: &Keypair,
        assurance: AssuranceLevel,
    ) -> SubmissionOutcome {
        let signed = match transaction.sign(signer) {
            Ok(signed) => signed,
            Err(e) => {
                return SubmissionOutcome::Failure {
                    reason: e.to_string(),
                    ambiguous: false,
                }
            }
        };

        info!(
            "Sending {} SOL to {} addresses...",
            lamports_to_sol(transaction.total_lamports()),
            transaction.recipients().len()
        );
        debug!(
            "Fee payer {}, blockhash {}",
            transaction.fee_payer(),
            transaction.recent_blockhash()
        );
        let started = Instant::now();

        match self.ledger.send_and_confirm(&signed, assurance).await {
            Ok(signature) => {
                info!(
                    "Transaction {} reached {} in {:.2}s",
                    signature,
                    assurance,
                    started.elapsed().as_secs_f64()
                );
                SubmissionOutcome::Success { signature }
            }
            Err(e) => {
                let ambiguous = e.is_ambiguous();
                if ambiguous {
                    // The first signature identifies the transaction even when unconfirmed
                    warn!(
                        "Outcome of transaction {} is unknown, check it before resending: {}",
                        signed.signatures[0], e
                    );
                } else {
                    warn!("Transaction failed: {}", e);
                }
                SubmissionOutcome::Failure {
                    reason: e.to_string(),
                    ambiguous,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::transfer::batcher::Batch;
    use crate::transfer::builder::{BuildOutcome, TransferBuilder};
    use async_trait::async_trait;
    use solana_sdk::{hash::Hash, pubkey::Pubkey, signer::Signer, transaction::Transaction};
    use std::sync::Mutex;

    /// Ledger that records what it was asked to send and replays a scripted result
    struct ScriptedLedger {
        result: fn() -> Result<()>,
        sent: Mutex<Vec<(Transaction, AssuranceLevel)>>,
    }

    impl ScriptedLedger {
        fn new(result: fn() -> Result<()>) -> Self {
            Self {
                result,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Ledger for ScriptedLedger {
        async fn balance(&self, _account: &Pubkey) -> Result<u64> {
            Ok(0)
        }

        async fn latest_blockhash(&self) -> Result<Hash> {
            Ok(Hash::new_unique())
        }

        async fn send_and_confirm(
            &self,
            transaction: &Transaction,
            assurance: AssuranceLevel,
        ) -> Result<Signature> {
            self.sent
                .lock()
                .unwrap()
                .push((transaction.clone(), assurance));
            (self.result)().map(|_| transaction.signatures[0])
        }
    }

    async fn build(ledger: Arc<ScriptedLedger>, funder: &Keypair) -> TransferTransaction {
        let batch = Batch {
            number: 1,
            addresses: vec![Pubkey::new_unique().to_string(), Pubkey::new_unique().to_string()],
        };
        match TransferBuilder::new(ledger)
            .build(&funder.pubkey(), &batch, 1_000)
            .await
            .unwrap()
        {
            BuildOutcome::Ready { transaction, .. } => transaction,
            BuildOutcome::Empty { .. } => panic!("expected a transaction"),
        }
    }

    #[tokio::test]
    async fn test_success_returns_signature() {
        let ledger = Arc::new(ScriptedLedger::new(|| Ok(())));
        let funder = Keypair::new();
        let transaction = build(ledger.clone(), &funder).await;

        let engine = SubmissionEngine::new(ledger.clone());
        let outcome = engine
            .submit(transaction, &funder, AssuranceLevel::Finalized)
            .await;

        let sent = ledger.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, AssuranceLevel::Finalized);
        assert_eq!(
            outcome,
            SubmissionOutcome::Success {
                signature: sent[0].0.signatures[0]
            }
        );
    }

    #[tokio::test]
    async fn test_rejection_is_definite_failure() {
        let ledger = Arc::new(ScriptedLedger::new(|| {
            Err(Error::TransactionRejected("insufficient funds".into()))
        }));
        let funder = Keypair::new();
        let transaction = build(ledger.clone(), &funder).await;

        let outcome = SubmissionEngine::new(ledger)
            .submit(transaction, &funder, AssuranceLevel::Confirmed)
            .await;

        match outcome {
            SubmissionOutcome::Failure { reason, ambiguous } => {
                assert!(!ambiguous);
                assert!(reason.contains("insufficient funds"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_ambiguous_failure() {
        let ledger = Arc::new(ScriptedLedger::new(|| {
            Err(Error::ConfirmationUnknown("unable to confirm transaction".into()))
        }));
        let funder = Keypair::new();
        let transaction = build(ledger.clone(), &funder).await;

        let outcome = SubmissionEngine::new(ledger.clone())
            .submit(transaction, &funder, AssuranceLevel::Confirmed)
            .await;

        assert!(matches!(
            outcome,
            SubmissionOutcome::Failure {
                ambiguous: true,
                ..
            }
        ));
        // No retry
        assert_eq!(ledger.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_signer_never_sent() {
        let ledger = Arc::new(ScriptedLedger::new(|| Ok(())));
        let funder = Keypair::new();
        let transaction = build(ledger.clone(), &funder).await;

        let outcome = SubmissionEngine::new(ledger.clone())
            .submit(transaction, &Keypair::new(), AssuranceLevel::Confirmed)
            .await;

        assert!(matches!(
            outcome,
            SubmissionOutcome::Failure {
                ambiguous: false,
                ..
            }
        ));
        assert!(ledger.sent.lock().unwrap().is_empty());
    }
}
