use crate::domain::deposit::{
    CallContext, DepositRequest, PROP_DEPOSIT_EFFECTIVE_DATE,
    PROP_DEPOSIT_PAYMENT_REFERENCE_NUMBER, PROP_DEPOSIT_TYPE,
};
use crate::domain::payment::PluginProperties;
use crate::domain::ports::{Account, AccountApi, InvoiceApi, PaymentApi};
use crate::error::{DepositError, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Distributes one inbound deposit across its invoice allocations, in caller
/// order, halting the batch on the first rejection.
///
/// Allocations applied before a mid-batch failure stay applied; there is no
/// compensating rollback.
pub struct DepositDistributor {
    accounts: Arc<dyn AccountApi>,
    invoices: Arc<dyn InvoiceApi>,
    payments: Arc<dyn PaymentApi>,
}

impl DepositDistributor {
    pub fn new(
        accounts: Arc<dyn AccountApi>,
        invoices: Arc<dyn InvoiceApi>,
        payments: Arc<dyn PaymentApi>,
    ) -> Self {
        Self {
            accounts,
            invoices,
            payments,
        }
    }

    /// Records the deposit described by `request`.
    ///
    /// Validation happens before any side effect: the account must exist and
    /// the reference number, deposit type and effective date must all be
    /// present. Only then is the deposit payment method resolved (created on
    /// first use) and the allocation loop entered.
    pub async fn record_deposits(&self, request: &DepositRequest, ctx: &CallContext) -> Result<()> {
        let account = match self.accounts.account_by_id(request.account_id).await? {
            Some(account) => account,
            None => {
                info!(account_id = %request.account_id, "account not found");
                return Err(DepositError::AccountNotFound(request.account_id));
            }
        };

        let (Some(reference_number), Some(deposit_type), Some(effective_date)) = (
            request.payment_reference_number.as_deref(),
            request.deposit_type.as_deref(),
            request.effective_date,
        ) else {
            return Err(DepositError::Validation(
                "paymentReferenceNumber, depositType and effectiveDate are required".to_owned(),
            ));
        };

        let payment_method_id = self.get_or_create_payment_method(&account, ctx).await?;

        let properties = PluginProperties::from([
            (
                PROP_DEPOSIT_PAYMENT_REFERENCE_NUMBER.to_owned(),
                reference_number.to_owned(),
            ),
            (PROP_DEPOSIT_TYPE.to_owned(), deposit_type.to_owned()),
            (
                PROP_DEPOSIT_EFFECTIVE_DATE.to_owned(),
                effective_date.to_rfc3339(),
            ),
        ]);

        for allocation in &request.payments {
            let amount = match allocation.payment_amount {
                Some(amount) if amount != Decimal::ZERO => amount,
                // Absent or zero amounts are skipped silently.
                _ => continue,
            };

            let invoice = match self
                .invoices
                .invoice_by_number(allocation.invoice_number)
                .await?
            {
                Some(invoice) => invoice,
                None => {
                    info!(invoice_number = allocation.invoice_number, "invoice not found");
                    return Err(DepositError::InvoiceNotFound(allocation.invoice_number));
                }
            };

            if let Err(e) = self
                .payments
                .purchase_for_invoice(
                    &account,
                    &invoice,
                    payment_method_id,
                    amount,
                    effective_date,
                    &properties,
                    ctx,
                )
                .await
            {
                if matches!(e, DepositError::ControlRejected { .. }) {
                    info!(invoice_number = invoice.invoice_number, "payment aborted");
                }
                return Err(e);
            }
        }

        Ok(())
    }

    /// Resolves the account's deposit payment method, creating exactly one on
    /// first use. Concurrent requests against the same account can race here;
    /// the engine tolerates the resulting duplicate and leaves prevention to a
    /// storage-level uniqueness constraint.
    async fn get_or_create_payment_method(
        &self,
        account: &Account,
        ctx: &CallContext,
    ) -> Result<Uuid> {
        let existing = self.payments.account_payment_methods(account.id, ctx).await?;
        if let Some(method) = existing.first() {
            return Ok(method.payment_method_id);
        }
        self.payments.add_payment_method(account, ctx).await
    }
}
