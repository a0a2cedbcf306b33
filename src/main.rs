use clap::Parser;
use deposit_engine::application::control::ThresholdGuard;
use deposit_engine::application::distributor::DepositDistributor;
use deposit_engine::application::pipeline::DirectPaymentPipeline;
use deposit_engine::application::provider::DepositPaymentProvider;
use deposit_engine::domain::config::ConfigHandler;
use deposit_engine::domain::deposit::DepositRequest;
use deposit_engine::domain::ports::LedgerStore;
use deposit_engine::infrastructure::in_memory::InMemoryLedger;
use deposit_engine::infrastructure::static_host::{HostFixture, StaticHost};
use deposit_engine::interfaces::api::{DepositApi, RequestHeaders};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host fixture JSON (tenant, accounts, invoices, optional config)
    fixture: PathBuf,

    /// Deposit request JSON
    request: PathBuf,

    /// Path to persistent ledger (optional). Requires the storage-rocksdb feature.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Correlation id, reused as the tracking token when it is a valid UUID
    #[arg(long)]
    request_id: Option<String>,

    /// Audit actor
    #[arg(long)]
    created_by: Option<String>,

    /// Audit reason
    #[arg(long)]
    reason: Option<String>,

    /// Audit comment
    #[arg(long)]
    comment: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let fixture: HostFixture =
        serde_json::from_reader(File::open(&cli.fixture).into_diagnostic()?).into_diagnostic()?;
    let request: DepositRequest =
        serde_json::from_reader(File::open(&cli.request).into_diagnostic()?).into_diagnostic()?;

    let ledger: Arc<dyn LedgerStore> = match &cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => Arc::new(
            deposit_engine::infrastructure::rocksdb::RocksDbLedger::open(db_path)
                .into_diagnostic()?,
        ),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            return Err(miette::miette!(
                "--db-path requires building with the storage-rocksdb feature"
            ));
        }
        None => Arc::new(InMemoryLedger::new()),
    };

    let config_handler = Arc::new(ConfigHandler::new());
    if let Some(config) = fixture.config.clone() {
        config_handler.install(fixture.tenant_id, config);
    }

    let host = Arc::new(StaticHost::from_fixture(&fixture));
    let pipeline = DirectPaymentPipeline::new(
        ThresholdGuard::new(config_handler),
        DepositPaymentProvider::new(ledger),
    );
    let distributor = DepositDistributor::new(host.clone(), host, Arc::new(pipeline));
    let api = DepositApi::new(distributor);

    let headers = RequestHeaders {
        request_id: cli.request_id,
        created_by: cli.created_by,
        reason: cli.reason,
        comment: cli.comment,
    };

    let category = api
        .record_deposits(&request, headers, fixture.tenant_id)
        .await;
    println!("{} ({})", category.as_str(), category.status_code());

    Ok(())
}
