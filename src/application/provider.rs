use crate::domain::deposit::{CallContext, Currency};
use crate::domain::payment::{
    PaymentMethodInfo, PaymentMethodRow, PaymentStatus, PaymentTransactionInfo, PluginProperties,
    TransactionRow, TransactionType,
};
use crate::domain::ports::LedgerStore;
use crate::error::{DepositError, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Payment/payment-method provider surface exposed to the host.
///
/// Deposits are recorded as already-settled, so `purchase_payment` writes the
/// ledger and reports `Processed` without contacting any external network.
/// The remaining lifecycle operations are deliberate terminal stubs.
pub struct DepositPaymentProvider {
    ledger: Arc<dyn LedgerStore>,
}

impl DepositPaymentProvider {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    pub async fn add_payment_method(
        &self,
        account_id: Uuid,
        payment_method_id: Uuid,
        properties: &PluginProperties,
        // Pass-through; the engine never recomputes the default flag.
        _set_default: bool,
        ctx: &CallContext,
    ) -> Result<()> {
        let utc_now = Utc::now();
        let row = PaymentMethodRow::new(
            account_id,
            payment_method_id,
            properties,
            utc_now,
            ctx.tenant_id,
        )?;
        self.ledger.register_payment_method(row).await
    }

    /// Records one purchase in the ledger and reads back the stored response.
    #[allow(clippy::too_many_arguments)]
    pub async fn purchase_payment(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
        payment_transaction_id: Uuid,
        _payment_method_id: Uuid,
        amount: Decimal,
        currency: Option<Currency>,
        properties: &PluginProperties,
        ctx: &CallContext,
    ) -> Result<PaymentTransactionInfo> {
        let row = TransactionRow::new(
            account_id,
            payment_id,
            payment_transaction_id,
            TransactionType::Purchase,
            Some(amount),
            currency,
            properties,
            Utc::now(),
            ctx.tenant_id,
        )?;
        self.ledger.record_transaction(row).await?;

        let infos = self.payment_info(account_id, payment_id).await?;
        infos
            .into_iter()
            .find(|info| info.payment_transaction_id == payment_transaction_id)
            .ok_or_else(|| DepositError::Storage("recorded transaction not found".to_owned()))
    }

    /// Reconstructed transaction history for one payment.
    pub async fn payment_info(
        &self,
        _account_id: Uuid,
        payment_id: Uuid,
    ) -> Result<Vec<PaymentTransactionInfo>> {
        let rows = self.ledger.responses_by_payment(payment_id).await?;
        rows.iter().map(PaymentTransactionInfo::from_row).collect()
    }

    /// Registered (non-deleted) payment methods for one account.
    pub async fn payment_methods(&self, account_id: Uuid) -> Result<Vec<PaymentMethodInfo>> {
        let rows = self.ledger.payment_methods_by_account(account_id).await?;
        rows.iter()
            .filter(|row| !row.is_deleted)
            .map(PaymentMethodInfo::from_row)
            .collect()
    }

    pub async fn authorize_payment(
        &self,
        payment_id: Uuid,
        payment_transaction_id: Uuid,
        amount: Decimal,
        currency: Option<Currency>,
    ) -> Result<PaymentTransactionInfo> {
        Ok(Self::unsupported_info(
            payment_id,
            payment_transaction_id,
            TransactionType::Authorize,
            Some(amount),
            currency,
        ))
    }

    pub async fn capture_payment(
        &self,
        payment_id: Uuid,
        payment_transaction_id: Uuid,
        amount: Decimal,
        currency: Option<Currency>,
    ) -> Result<PaymentTransactionInfo> {
        Ok(Self::unsupported_info(
            payment_id,
            payment_transaction_id,
            TransactionType::Capture,
            Some(amount),
            currency,
        ))
    }

    pub async fn void_payment(
        &self,
        payment_id: Uuid,
        payment_transaction_id: Uuid,
    ) -> Result<PaymentTransactionInfo> {
        Ok(Self::unsupported_info(
            payment_id,
            payment_transaction_id,
            TransactionType::Void,
            None,
            None,
        ))
    }

    pub async fn credit_payment(
        &self,
        payment_id: Uuid,
        payment_transaction_id: Uuid,
        amount: Decimal,
        currency: Option<Currency>,
    ) -> Result<PaymentTransactionInfo> {
        Ok(Self::unsupported_info(
            payment_id,
            payment_transaction_id,
            TransactionType::Credit,
            Some(amount),
            currency,
        ))
    }

    pub async fn refund_payment(
        &self,
        payment_id: Uuid,
        payment_transaction_id: Uuid,
        amount: Decimal,
        currency: Option<Currency>,
    ) -> Result<PaymentTransactionInfo> {
        Ok(Self::unsupported_info(
            payment_id,
            payment_transaction_id,
            TransactionType::Refund,
            Some(amount),
            currency,
        ))
    }

    pub async fn build_form_descriptor(&self, _account_id: Uuid) -> Result<()> {
        Err(DepositError::Unsupported("build_form_descriptor"))
    }

    pub async fn process_notification(&self, _notification: &str) -> Result<()> {
        Err(DepositError::Unsupported("process_notification"))
    }

    /// Synthetic canceled response for the stubbed lifecycle operations.
    /// Nothing is written to the ledger.
    fn unsupported_info(
        payment_id: Uuid,
        payment_transaction_id: Uuid,
        transaction_type: TransactionType,
        amount: Option<Decimal>,
        currency: Option<Currency>,
    ) -> PaymentTransactionInfo {
        let utc_now = Utc::now();
        PaymentTransactionInfo {
            payment_id,
            payment_transaction_id,
            transaction_type,
            amount,
            currency,
            status: PaymentStatus::Canceled,
            gateway_error: Some("Unsupported operation".to_owned()),
            first_reference_id: None,
            created_date: utc_now,
            updated_date: utc_now,
            properties: PluginProperties::new(),
        }
    }
}
