use crate::domain::deposit::{CallContext, Currency};
use crate::domain::payment::{PaymentMethodInfo, PaymentMethodRow, TransactionRow};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Host view of a billing account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
}

/// Host view of an invoice, addressed by its public sequence number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: u32,
    pub currency: Currency,
}

#[async_trait]
pub trait AccountApi: Send + Sync {
    async fn account_by_id(&self, account_id: Uuid) -> Result<Option<Account>>;
}

#[async_trait]
pub trait InvoiceApi: Send + Sync {
    async fn invoice_by_number(&self, invoice_number: u32) -> Result<Option<Invoice>>;
}

/// The host's payment pipeline, as seen by the distributor.
///
/// `purchase_for_invoice` runs the full transaction pipeline: the control
/// hook decides allow/abort before the provider records anything.
#[async_trait]
pub trait PaymentApi: Send + Sync {
    /// Payment methods registered for the account under the engine's plugin
    /// identity.
    async fn account_payment_methods(
        &self,
        account_id: Uuid,
        ctx: &CallContext,
    ) -> Result<Vec<PaymentMethodInfo>>;

    /// Registers a new payment method for the account and returns its id.
    async fn add_payment_method(&self, account: &Account, ctx: &CallContext) -> Result<Uuid>;

    #[allow(clippy::too_many_arguments)]
    async fn purchase_for_invoice(
        &self,
        account: &Account,
        invoice: &Invoice,
        payment_method_id: Uuid,
        amount: Decimal,
        effective_date: DateTime<Utc>,
        properties: &crate::domain::payment::PluginProperties,
        ctx: &CallContext,
    ) -> Result<()>;
}

/// Append-only persistence for payment-method registrations and transaction
/// responses.
///
/// Implementations scope each write to a single statement; nothing here spans
/// multiple allocations, and no write is ever retried internally.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn register_payment_method(&self, row: PaymentMethodRow) -> Result<()>;

    async fn record_transaction(&self, row: TransactionRow) -> Result<()>;

    async fn payment_methods_by_account(&self, account_id: Uuid)
        -> Result<Vec<PaymentMethodRow>>;

    async fn payment_method_by_id(
        &self,
        payment_method_id: Uuid,
    ) -> Result<Option<PaymentMethodRow>>;

    /// Responses for one payment, in insertion order.
    async fn responses_by_payment(&self, payment_id: Uuid) -> Result<Vec<TransactionRow>>;

    /// Responses carrying the given deposit reference number.
    async fn responses_by_reference(&self, reference: &str) -> Result<Vec<TransactionRow>>;
}
