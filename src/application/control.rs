use crate::domain::config::ConfigSource;
use crate::domain::deposit::Currency;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of the prior-call control hook.
///
/// On abort, `amount` and `minimum` carry the offending pair for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorControlResult {
    pub aborted: bool,
    pub amount: Option<Decimal>,
    pub minimum: Option<Decimal>,
}

impl PriorControlResult {
    fn proceed() -> Self {
        Self {
            aborted: false,
            amount: None,
            minimum: None,
        }
    }

    fn abort(amount: Decimal, minimum: Decimal) -> Self {
        Self {
            aborted: true,
            amount: Some(amount),
            minimum: Some(minimum),
        }
    }
}

/// Minimum-amount gate applied before any deposit transaction proceeds.
///
/// Fail-open: a missing amount, tenant entry, currency entry, or a
/// configuration-resolution failure never blocks a payment. The only abort
/// case is a configured minimum strictly greater than the proposed amount.
pub struct ThresholdGuard {
    config: Arc<dyn ConfigSource>,
}

impl ThresholdGuard {
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self { config }
    }

    pub fn prior_call(
        &self,
        tenant_id: Uuid,
        currency: &Currency,
        amount: Option<Decimal>,
    ) -> PriorControlResult {
        let snapshot = match self.config.current(tenant_id) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(%tenant_id, error = %e, "configuration lookup failed, proceeding");
                return PriorControlResult::proceed();
            }
        };

        let (Some(amount), Some(config)) = (amount, snapshot) else {
            return PriorControlResult::proceed();
        };
        let Some(minimum) = config.min_amount(currency) else {
            return PriorControlResult::proceed();
        };
        if minimum <= amount {
            return PriorControlResult::proceed();
        }

        info!(%amount, %minimum, %currency, "aborting payment below minimum");
        PriorControlResult::abort(amount, minimum)
    }
}
