use crate::domain::config::DepositConfig;
use crate::domain::ports::{Account, AccountApi, Invoice, InvoiceApi};
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Fixture document describing the host-side state the engine collaborates
/// with: one tenant, its accounts and invoices, and an optional deposit
/// configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostFixture {
    pub tenant_id: Uuid,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub config: Option<DepositConfig>,
}

/// Fixture-backed account and invoice lookup, standing in for the host
/// platform in the demo binary and in tests.
pub struct StaticHost {
    accounts: HashMap<Uuid, Account>,
    invoices: HashMap<u32, Invoice>,
}

impl StaticHost {
    pub fn new(accounts: Vec<Account>, invoices: Vec<Invoice>) -> Self {
        Self {
            accounts: accounts.into_iter().map(|a| (a.id, a)).collect(),
            invoices: invoices
                .into_iter()
                .map(|i| (i.invoice_number, i))
                .collect(),
        }
    }

    pub fn from_fixture(fixture: &HostFixture) -> Self {
        Self::new(fixture.accounts.clone(), fixture.invoices.clone())
    }
}

#[async_trait]
impl AccountApi for StaticHost {
    async fn account_by_id(&self, account_id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.get(&account_id).cloned())
    }
}

#[async_trait]
impl InvoiceApi for StaticHost {
    async fn invoice_by_number(&self, invoice_number: u32) -> Result<Option<Invoice>> {
        Ok(self.invoices.get(&invoice_number).cloned())
    }
}
