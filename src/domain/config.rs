use crate::domain::deposit::Currency;
use crate::error::{DepositError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Per-tenant deposit configuration: minimum deposit amount by currency.
///
/// A missing currency entry is a valid state and never blocks a payment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositConfig {
    #[serde(default)]
    pub min_amounts: BTreeMap<Currency, Decimal>,
}

impl DepositConfig {
    pub fn min_amount(&self, currency: &Currency) -> Option<Decimal> {
        self.min_amounts.get(currency).copied()
    }
}

/// Supplies the current configuration snapshot for a tenant.
///
/// A `None` snapshot means no configuration is installed, which is valid.
/// Callers treat an `Err` the same way (fail-open).
pub trait ConfigSource: Send + Sync {
    fn current(&self, tenant_id: Uuid) -> Result<Option<Arc<DepositConfig>>>;
}

/// Process-wide configuration state, keyed by tenant id.
///
/// Snapshots are replaced wholesale on change notifications; readers always
/// observe either the previous or the next complete snapshot.
#[derive(Default)]
pub struct ConfigHandler {
    per_tenant: RwLock<HashMap<Uuid, Arc<DepositConfig>>>,
}

impl ConfigHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs or replaces the tenant's configuration snapshot atomically.
    ///
    /// Entries are whole `Arc` snapshots, so the map stays usable even after
    /// a previous holder panicked; the write proceeds on the recovered guard.
    pub fn install(&self, tenant_id: Uuid, config: DepositConfig) {
        let mut per_tenant = match self.per_tenant.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        per_tenant.insert(tenant_id, Arc::new(config));
    }
}

impl ConfigSource for ConfigHandler {
    /// A poisoned lock surfaces as an error rather than a panic, so the
    /// control hook's fail-open path takes over.
    fn current(&self, tenant_id: Uuid) -> Result<Option<Arc<DepositConfig>>> {
        let per_tenant = self
            .per_tenant
            .read()
            .map_err(|_| DepositError::Upstream("configuration state poisoned".to_owned()))?;
        Ok(per_tenant.get(&tenant_id).cloned())
    }
}
