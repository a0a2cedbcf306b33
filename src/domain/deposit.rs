use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Transaction-level property carrying the deposit payment reference number.
pub const PROP_DEPOSIT_PAYMENT_REFERENCE_NUMBER: &str = "depositPaymentReferenceNumber";
/// Transaction-level property carrying the deposit type tag (e.g. "wire", "check").
pub const PROP_DEPOSIT_TYPE: &str = "depositType";
/// Transaction-level property carrying the deposit effective date.
pub const PROP_DEPOSIT_EFFECTIVE_DATE: &str = "depositEffectiveDate";

/// ISO 4217 style currency code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Currency {
    fn from(code: &str) -> Self {
        Self(code.to_owned())
    }
}

/// One (invoice, amount) pair within a deposit request.
///
/// A `None` or zero amount means the allocation is skipped silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceAllocation {
    pub invoice_number: u32,
    pub payment_amount: Option<Decimal>,
}

/// An inbound deposit to distribute across one or more invoices.
///
/// The three scalar fields are optional at the wire but mandatory at
/// validation time; allocation order is preserved and significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub account_id: Uuid,
    pub effective_date: Option<DateTime<Utc>>,
    pub payment_reference_number: Option<String>,
    pub deposit_type: Option<String>,
    #[serde(default)]
    pub payments: Vec<InvoiceAllocation>,
}

/// Per-call audit and scoping metadata, carried through every layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CallContext {
    pub user_token: Uuid,
    pub created_by: String,
    pub reason: Option<String>,
    pub comment: Option<String>,
    pub tenant_id: Uuid,
}
