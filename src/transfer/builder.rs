//! Transaction building for batched SOL transfers

use std::sync::Arc;

use solana_sdk::{
    hash::Hash, instruction::Instruction, pubkey::Pubkey, signature::Keypair,
    system_instruction, transaction::Transaction,
};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::transfer::batcher::Batch;
use crate::transfer::ledger::Ledger;
use crate::wallet::address::{self, InvalidAddress, RecipientAddress};

/// Unsigned multi-recipient transfer, built fresh for one batch
#[derive(Debug, Clone)]
pub struct TransferTransaction {
    fee_payer: Pubkey,
    recipients: Vec<RecipientAddress>,
    lamports_each: u64,
    instructions: Vec<Instruction>,
    recent_blockhash: Hash,
}

impl TransferTransaction {
    pub fn fee_payer(&self) -> &Pubkey {
        &self.fee_payer
    }

    /// Recipients with an instruction in this transaction, in batch order
    pub fn recipients(&self) -> &[RecipientAddress] {
        &self.recipients
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn recent_blockhash(&self) -> Hash {
        self.recent_blockhash
    }

    /// Total lamports leaving the fee payer, excluding fees
    pub fn total_lamports(&self) -> u64 {
        self.lamports_each.saturating_mul(self.recipients.len() as u64)
    }

    /// Sign with the fee payer's keypair
    pub fn sign(&self, signer: &Keypair) -> Result<Transaction> {
        let mut transaction =
            Transaction::new_with_payer(&self.instructions, Some(&self.fee_payer));
        transaction
            .try_sign(&[signer], self.recent_blockhash)
            .map_err(|e| Error::Signing(e.to_string()))?;
        Ok(transaction)
    }
}

/// Result of building one batch
#[derive(Debug)]
pub enum BuildOutcome {
    /// At least one recipient made it into the transaction
    Ready {
        transaction: TransferTransaction,
        skipped: Vec<InvalidAddress>,
    },
    /// Every address was rejected; nothing to submit
    Empty { skipped: Vec<InvalidAddress> },
}

/// Transaction builder for batched transfers
pub struct TransferBuilder {
    ledger: Arc<dyn Ledger>,
}

impl TransferBuilder {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// Build one transfer instruction per valid address in `batch`
    ///
    /// The blockhash is only fetched when there is something to send.
    pub async fn build(
        &self,
        funder: &Pubkey,
        batch: &Batch,
        lamports_each: u64,
    ) -> Result<BuildOutcome> {
        let mut recipients = Vec::with_capacity(batch.len());
        let mut instructions = Vec::with_capacity(batch.len());
        let mut skipped = Vec::new();

        for raw in &batch.addresses {
            match address::validate(raw) {
                Ok(recipient) => {
                    instructions.push(system_instruction::transfer(
                        funder,
                        recipient.pubkey(),
                        lamports_each,
                    ));
                    recipients.push(recipient);
                }
                Err(invalid) => {
                    warn!("Batch {}: skipping address {}", batch.number, invalid);
                    skipped.push(invalid);
                }
            }
        }

        if instructions.is_empty() {
            warn!(
                "Batch {}: no valid instructions, batch will not be sent",
                batch.number
            );
            return Ok(BuildOutcome::Empty { skipped });
        }

        let recent_blockhash = self.ledger.latest_blockhash().await?;
        debug!(
            "Batch {}: built {} transfers of {} lamports (blockhash {})",
            batch.number,
            instructions.len(),
            lamports_each,
            recent_blockhash
        );

        Ok(BuildOutcome::Ready {
            transaction: TransferTransaction {
                fee_payer: *funder,
                recipients,
                lamports_each,
                instructions,
                recent_blockhash,
            },
            skipped,
        })
    }
}
