use crate::application::control::ThresholdGuard;
use crate::application::provider::DepositPaymentProvider;
use crate::domain::deposit::{CallContext, PROP_DEPOSIT_EFFECTIVE_DATE};
use crate::domain::payment::{PaymentMethodInfo, PluginProperties};
use crate::domain::ports::{Account, Invoice, PaymentApi};
use crate::error::{DepositError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// In-process transaction pipeline: the control hook gates every purchase
/// before the provider records it, mirroring the host's plumbing so the
/// engine runs end to end without a live platform.
pub struct DirectPaymentPipeline {
    guard: ThresholdGuard,
    provider: DepositPaymentProvider,
}

impl DirectPaymentPipeline {
    pub fn new(guard: ThresholdGuard, provider: DepositPaymentProvider) -> Self {
        Self { guard, provider }
    }
}

#[async_trait]
impl PaymentApi for DirectPaymentPipeline {
    async fn account_payment_methods(
        &self,
        account_id: Uuid,
        _ctx: &CallContext,
    ) -> Result<Vec<PaymentMethodInfo>> {
        self.provider.payment_methods(account_id).await
    }

    async fn add_payment_method(&self, account: &Account, ctx: &CallContext) -> Result<Uuid> {
        let payment_method_id = Uuid::new_v4();
        self.provider
            .add_payment_method(account.id, payment_method_id, &PluginProperties::new(), false, ctx)
            .await?;
        Ok(payment_method_id)
    }

    async fn purchase_for_invoice(
        &self,
        account: &Account,
        invoice: &Invoice,
        payment_method_id: Uuid,
        amount: Decimal,
        effective_date: DateTime<Utc>,
        properties: &PluginProperties,
        ctx: &CallContext,
    ) -> Result<()> {
        let decision = self
            .guard
            .prior_call(ctx.tenant_id, &invoice.currency, Some(amount));
        if decision.aborted {
            return Err(DepositError::ControlRejected {
                amount: decision.amount.unwrap_or(amount),
                minimum: decision.minimum.unwrap_or_default(),
            });
        }

        // The effective date reaches the stored row even when the caller did
        // not pass it as a property; an explicit property wins.
        let mut properties = properties.clone();
        properties
            .entry(PROP_DEPOSIT_EFFECTIVE_DATE.to_owned())
            .or_insert_with(|| effective_date.to_rfc3339());

        self.provider
            .purchase_payment(
                account.id,
                Uuid::new_v4(),
                Uuid::new_v4(),
                payment_method_id,
                amount,
                Some(invoice.currency.clone()),
                &properties,
                ctx,
            )
            .await?;
        Ok(())
    }
}
