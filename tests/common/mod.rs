use chrono::{TimeZone, Utc};
use deposit_engine::application::control::ThresholdGuard;
use deposit_engine::application::distributor::DepositDistributor;
use deposit_engine::application::pipeline::DirectPaymentPipeline;
use deposit_engine::application::provider::DepositPaymentProvider;
use deposit_engine::domain::config::{ConfigHandler, DepositConfig};
use deposit_engine::domain::deposit::{Currency, DepositRequest, InvoiceAllocation};
use deposit_engine::domain::ports::{Account, Invoice};
use deposit_engine::infrastructure::in_memory::InMemoryLedger;
use deposit_engine::infrastructure::static_host::StaticHost;
use deposit_engine::interfaces::api::DepositApi;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

pub struct TestApp {
    pub api: DepositApi,
    pub ledger: Arc<InMemoryLedger>,
    pub account_id: Uuid,
    pub tenant_id: Uuid,
}

/// Wires the engine end to end against a fixture host with one account and
/// two USD invoices (#100 and #101), optionally installing a USD minimum.
pub fn test_app(min_usd: Option<Decimal>) -> TestApp {
    let tenant_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();

    let host = Arc::new(StaticHost::new(
        vec![Account {
            id: account_id,
            name: Some("Acme".to_owned()),
        }],
        vec![
            Invoice {
                id: Uuid::new_v4(),
                invoice_number: 100,
                currency: Currency::from("USD"),
            },
            Invoice {
                id: Uuid::new_v4(),
                invoice_number: 101,
                currency: Currency::from("USD"),
            },
        ],
    ));

    let config_handler = Arc::new(ConfigHandler::new());
    if let Some(minimum) = min_usd {
        let mut config = DepositConfig::default();
        config.min_amounts.insert(Currency::from("USD"), minimum);
        config_handler.install(tenant_id, config);
    }

    let ledger = Arc::new(InMemoryLedger::new());
    let pipeline = DirectPaymentPipeline::new(
        ThresholdGuard::new(config_handler),
        DepositPaymentProvider::new(ledger.clone()),
    );
    let distributor = DepositDistributor::new(host.clone(), host, Arc::new(pipeline));

    TestApp {
        api: DepositApi::new(distributor),
        ledger,
        account_id,
        tenant_id,
    }
}

pub fn wire_request(account_id: Uuid, allocations: &[(u32, &str)]) -> DepositRequest {
    DepositRequest {
        account_id,
        effective_date: Some(Utc.with_ymd_and_hms(2012, 2, 1, 0, 0, 0).unwrap()),
        payment_reference_number: Some("WIRE-12345".to_owned()),
        deposit_type: Some("wire".to_owned()),
        payments: allocations
            .iter()
            .map(|(invoice_number, amount)| InvoiceAllocation {
                invoice_number: *invoice_number,
                payment_amount: Some(amount.parse().unwrap()),
            })
            .collect(),
    }
}
