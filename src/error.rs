use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Failure taxonomy for the deposit engine.
///
/// Validation and not-found failures are detected before any mutation and are
/// not retryable. `Storage` and `Upstream` are retryable by the caller; the
/// engine itself never retries.
#[derive(Error, Debug)]
pub enum DepositError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("account not found: {0}")]
    AccountNotFound(Uuid),
    #[error("invoice not found: #{0}")]
    InvoiceNotFound(u32),
    #[error("payment aborted: amount '{amount}' below minimum '{minimum}'")]
    ControlRejected { amount: Decimal, minimum: Decimal },
    #[error("storage error: {0}")]
    Storage(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl From<serde_json::Error> for DepositError {
    fn from(e: serde_json::Error) -> Self {
        DepositError::Storage(format!("serialization error: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, DepositError>;
