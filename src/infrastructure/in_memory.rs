use crate::domain::payment::{PaymentMethodRow, TransactionRow};
use crate::domain::ports::LedgerStore;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory ledger.
///
/// Rows are appended to shared vectors behind `Arc<RwLock<..>>`, preserving
/// insertion order. Each operation holds the lock for that single statement
/// only. Ideal for tests and the default demo wiring.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    payment_methods: Arc<RwLock<Vec<PaymentMethodRow>>>,
    responses: Arc<RwLock<Vec<TransactionRow>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn register_payment_method(&self, row: PaymentMethodRow) -> Result<()> {
        let mut payment_methods = self.payment_methods.write().await;
        payment_methods.push(row);
        Ok(())
    }

    async fn record_transaction(&self, row: TransactionRow) -> Result<()> {
        let mut responses = self.responses.write().await;
        responses.push(row);
        Ok(())
    }

    async fn payment_methods_by_account(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<PaymentMethodRow>> {
        let payment_methods = self.payment_methods.read().await;
        Ok(payment_methods
            .iter()
            .filter(|row| row.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn payment_method_by_id(
        &self,
        payment_method_id: Uuid,
    ) -> Result<Option<PaymentMethodRow>> {
        let payment_methods = self.payment_methods.read().await;
        Ok(payment_methods
            .iter()
            .find(|row| row.payment_method_id == payment_method_id)
            .cloned())
    }

    async fn responses_by_payment(&self, payment_id: Uuid) -> Result<Vec<TransactionRow>> {
        let responses = self.responses.read().await;
        Ok(responses
            .iter()
            .filter(|row| row.payment_id == payment_id)
            .cloned()
            .collect())
    }

    async fn responses_by_reference(&self, reference: &str) -> Result<Vec<TransactionRow>> {
        let responses = self.responses.read().await;
        Ok(responses
            .iter()
            .filter(|row| row.deposit_reference_number.as_deref() == Some(reference))
            .cloned()
            .collect())
    }
}
