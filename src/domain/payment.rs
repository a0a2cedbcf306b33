use crate::domain::deposit::{
    Currency, PROP_DEPOSIT_EFFECTIVE_DATE, PROP_DEPOSIT_PAYMENT_REFERENCE_NUMBER,
    PROP_DEPOSIT_TYPE,
};
use crate::error::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Opaque per-call property map, string keys to string values.
pub type PluginProperties = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Authorize,
    Capture,
    Purchase,
    Void,
    Credit,
    Refund,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionType::Authorize => "AUTHORIZE",
            TransactionType::Capture => "CAPTURE",
            TransactionType::Purchase => "PURCHASE",
            TransactionType::Void => "VOID",
            TransactionType::Credit => "CREDIT",
            TransactionType::Refund => "REFUND",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Processed,
    Canceled,
}

/// Serializes a property map into the opaque blob column.
///
/// An empty map stores as absent rather than `{}` to save space.
pub fn to_additional_data(properties: &PluginProperties) -> Result<Option<String>> {
    if properties.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(properties)?))
}

/// Rebuilds the property map from the blob column; absent blob means empty map.
pub fn from_additional_data(additional_data: Option<&str>) -> Result<PluginProperties> {
    match additional_data {
        None => Ok(PluginProperties::new()),
        Some(raw) => Ok(serde_json::from_str(raw)?),
    }
}

/// One registered payment method. Append-only; no update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodRow {
    pub account_id: Uuid,
    pub payment_method_id: Uuid,
    pub is_default: bool,
    pub is_deleted: bool,
    pub additional_data: Option<String>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
    pub tenant_id: Uuid,
}

impl PaymentMethodRow {
    pub fn new(
        account_id: Uuid,
        payment_method_id: Uuid,
        properties: &PluginProperties,
        utc_now: DateTime<Utc>,
        tenant_id: Uuid,
    ) -> Result<Self> {
        Ok(Self {
            account_id,
            payment_method_id,
            is_default: false,
            is_deleted: false,
            additional_data: to_additional_data(properties)?,
            created_date: utc_now,
            updated_date: utc_now,
            tenant_id,
        })
    }
}

/// One recorded transaction response. Never mutated or deleted.
///
/// The three deposit properties are extracted into dedicated columns and also
/// retained inside `additional_data`, so the read path needs no column-aware
/// merge logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub account_id: Uuid,
    pub payment_id: Uuid,
    pub payment_transaction_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: Option<Decimal>,
    pub currency: Option<Currency>,
    pub deposit_type: Option<String>,
    pub deposit_reference_number: Option<String>,
    pub deposit_effective_date: Option<String>,
    pub additional_data: Option<String>,
    pub created_date: DateTime<Utc>,
    pub tenant_id: Uuid,
}

impl TransactionRow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        account_id: Uuid,
        payment_id: Uuid,
        payment_transaction_id: Uuid,
        transaction_type: TransactionType,
        amount: Option<Decimal>,
        currency: Option<Currency>,
        properties: &PluginProperties,
        utc_now: DateTime<Utc>,
        tenant_id: Uuid,
    ) -> Result<Self> {
        Ok(Self {
            account_id,
            payment_id,
            payment_transaction_id,
            transaction_type,
            amount,
            currency,
            deposit_type: properties.get(PROP_DEPOSIT_TYPE).cloned(),
            deposit_reference_number: properties
                .get(PROP_DEPOSIT_PAYMENT_REFERENCE_NUMBER)
                .cloned(),
            deposit_effective_date: properties.get(PROP_DEPOSIT_EFFECTIVE_DATE).cloned(),
            additional_data: to_additional_data(properties)?,
            created_date: utc_now,
            tenant_id,
        })
    }
}

/// Reconstructed view of a recorded transaction, as reported back to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentTransactionInfo {
    pub payment_id: Uuid,
    pub payment_transaction_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: Option<Decimal>,
    pub currency: Option<Currency>,
    pub status: PaymentStatus,
    pub gateway_error: Option<String>,
    pub first_reference_id: Option<String>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
    pub properties: PluginProperties,
}

impl PaymentTransactionInfo {
    /// Rebuilds the transaction info from its ledger row.
    ///
    /// The dedicated reference-number column takes precedence over its blob
    /// twin; created and updated both carry the original write time.
    pub fn from_row(row: &TransactionRow) -> Result<Self> {
        let properties = from_additional_data(row.additional_data.as_deref())?;
        let first_reference_id = row
            .deposit_reference_number
            .clone()
            .or_else(|| properties.get(PROP_DEPOSIT_PAYMENT_REFERENCE_NUMBER).cloned());
        Ok(Self {
            payment_id: row.payment_id,
            payment_transaction_id: row.payment_transaction_id,
            transaction_type: row.transaction_type,
            amount: row.amount,
            currency: row.currency.clone(),
            status: PaymentStatus::Processed,
            gateway_error: None,
            first_reference_id,
            created_date: row.created_date,
            updated_date: row.created_date,
            properties,
        })
    }
}

/// Summary of a registered payment method, as reported back to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentMethodInfo {
    pub account_id: Uuid,
    pub payment_method_id: Uuid,
    pub is_default: bool,
    pub properties: PluginProperties,
}

impl PaymentMethodInfo {
    pub fn from_row(row: &PaymentMethodRow) -> Result<Self> {
        Ok(Self {
            account_id: row.account_id,
            payment_method_id: row.payment_method_id,
            is_default: row.is_default,
            properties: from_additional_data(row.additional_data.as_deref())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn deposit_properties() -> PluginProperties {
        PluginProperties::from([
            (
                PROP_DEPOSIT_PAYMENT_REFERENCE_NUMBER.to_owned(),
                "WIRE-12345".to_owned(),
            ),
            (PROP_DEPOSIT_TYPE.to_owned(), "wire".to_owned()),
            (
                PROP_DEPOSIT_EFFECTIVE_DATE.to_owned(),
                "2012-02-01T00:00:00Z".to_owned(),
            ),
        ])
    }

    #[test]
    fn test_empty_properties_store_as_absent() {
        assert_eq!(to_additional_data(&PluginProperties::new()).unwrap(), None);
        assert_eq!(
            from_additional_data(None).unwrap(),
            PluginProperties::new()
        );
    }

    #[test]
    fn test_transaction_row_extracts_deposit_columns() {
        let row = TransactionRow::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            TransactionType::Purchase,
            Some(dec!(10.00)),
            Some(Currency::from("USD")),
            &deposit_properties(),
            Utc::now(),
            Uuid::new_v4(),
        )
        .unwrap();

        assert_eq!(row.deposit_reference_number.as_deref(), Some("WIRE-12345"));
        assert_eq!(row.deposit_type.as_deref(), Some("wire"));
        assert_eq!(
            row.deposit_effective_date.as_deref(),
            Some("2012-02-01T00:00:00Z")
        );
        // Blob twin retained alongside the dedicated columns.
        let blob = from_additional_data(row.additional_data.as_deref()).unwrap();
        assert_eq!(blob, deposit_properties());
    }

    #[test]
    fn test_info_reconstruction_prefers_dedicated_column() {
        let mut row = TransactionRow::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            TransactionType::Purchase,
            Some(dec!(10.00)),
            None,
            &deposit_properties(),
            Utc::now(),
            Uuid::new_v4(),
        )
        .unwrap();
        row.deposit_reference_number = Some("COLUMN-WINS".to_owned());

        let info = PaymentTransactionInfo::from_row(&row).unwrap();
        assert_eq!(info.first_reference_id.as_deref(), Some("COLUMN-WINS"));
        assert_eq!(info.status, PaymentStatus::Processed);
        // Absent currency reconstructs as no currency, never a default.
        assert_eq!(info.currency, None);
        assert_eq!(info.created_date, info.updated_date);
    }

    #[test]
    fn test_info_reference_falls_back_to_blob() {
        let mut row = TransactionRow::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            TransactionType::Purchase,
            Some(dec!(1.00)),
            Some(Currency::from("USD")),
            &deposit_properties(),
            Utc::now(),
            Uuid::new_v4(),
        )
        .unwrap();
        row.deposit_reference_number = None;

        let info = PaymentTransactionInfo::from_row(&row).unwrap();
        assert_eq!(info.first_reference_id.as_deref(), Some("WIRE-12345"));
    }
}
