use crate::domain::payment::{PaymentMethodRow, TransactionRow};
use crate::domain::ports::LedgerStore;
use crate::error::{DepositError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Column family for payment-method rows, keyed by payment-method id.
pub const CF_PAYMENT_METHODS: &str = "payment_methods";
/// Index from account id to payment-method id.
pub const CF_PAYMENT_METHOD_ACCOUNTS: &str = "payment_method_accounts";
/// Column family for transaction responses, keyed by payment id plus write
/// time, so a per-payment prefix scan yields insertion order.
pub const CF_RESPONSES: &str = "responses";
/// Index from deposit reference number to response key.
pub const CF_RESPONSE_REFERENCES: &str = "response_references";

/// A persistent ledger backed by RocksDB.
///
/// Rows are serialized with serde_json; secondary column families provide the
/// by-account and by-reference lookups. `Clone` shares the underlying
/// `Arc<DB>`, and every write is a single self-contained statement.
#[derive(Clone)]
pub struct RocksDbLedger {
    db: Arc<DB>,
    write_seq: Arc<AtomicU64>,
}

impl RocksDbLedger {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// all required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = vec![
            ColumnFamilyDescriptor::new(CF_PAYMENT_METHODS, Options::default()),
            ColumnFamilyDescriptor::new(CF_PAYMENT_METHOD_ACCOUNTS, Options::default()),
            ColumnFamilyDescriptor::new(CF_RESPONSES, Options::default()),
            ColumnFamilyDescriptor::new(CF_RESPONSE_REFERENCES, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cfs)
            .map_err(|e| DepositError::Storage(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_seq: Arc::new(AtomicU64::new(0)),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| DepositError::Storage(format!("column family {name} not found")))
    }

    /// Timestamp orders rows per payment; the sequence breaks ties between
    /// writes sharing a clock reading, keeping the prefix scan in insertion
    /// order.
    fn response_key(&self, row: &TransactionRow) -> Vec<u8> {
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let mut key = Vec::with_capacity(48);
        key.extend_from_slice(row.payment_id.as_bytes());
        key.extend_from_slice(&row.created_date.timestamp_micros().to_be_bytes());
        key.extend_from_slice(&seq.to_be_bytes());
        key.extend_from_slice(row.payment_transaction_id.as_bytes());
        key
    }

    fn account_index_key(account_id: Uuid, payment_method_id: Uuid) -> Vec<u8> {
        let mut key = Vec::with_capacity(32);
        key.extend_from_slice(account_id.as_bytes());
        key.extend_from_slice(payment_method_id.as_bytes());
        key
    }

    fn reference_index_key(reference: &str, response_key: &[u8]) -> Vec<u8> {
        let mut key = Vec::with_capacity(reference.len() + 1 + response_key.len());
        key.extend_from_slice(reference.as_bytes());
        key.push(0);
        key.extend_from_slice(response_key);
        key
    }

    /// Collects values whose keys start with `prefix` in one column family.
    fn scan_prefix(&self, cf_name: &str, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let cf = self.cf(cf_name)?;
        let mut out = Vec::new();
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));
        for item in iter {
            let (key, value) = item.map_err(|e| DepositError::Storage(e.to_string()))?;
            if !key.starts_with(prefix) {
                break;
            }
            out.push((key.to_vec(), value.to_vec()));
        }
        Ok(out)
    }
}

#[async_trait]
impl LedgerStore for RocksDbLedger {
    async fn register_payment_method(&self, row: PaymentMethodRow) -> Result<()> {
        let value = serde_json::to_vec(&row)?;
        let cf = self.cf(CF_PAYMENT_METHODS)?;
        let index_cf = self.cf(CF_PAYMENT_METHOD_ACCOUNTS)?;

        // Row and account index commit in one atomic batch; a failed write
        // never leaves an unindexed row behind.
        let mut batch = WriteBatch::default();
        batch.put_cf(cf, row.payment_method_id.as_bytes(), value);
        batch.put_cf(
            index_cf,
            Self::account_index_key(row.account_id, row.payment_method_id),
            row.payment_method_id.as_bytes(),
        );
        self.db
            .write(batch)
            .map_err(|e| DepositError::Storage(e.to_string()))
    }

    async fn record_transaction(&self, row: TransactionRow) -> Result<()> {
        let key = self.response_key(&row);
        let value = serde_json::to_vec(&row)?;
        let cf = self.cf(CF_RESPONSES)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(cf, &key, value);
        if let Some(reference) = &row.deposit_reference_number {
            let index_cf = self.cf(CF_RESPONSE_REFERENCES)?;
            batch.put_cf(index_cf, Self::reference_index_key(reference, &key), &key);
        }
        self.db
            .write(batch)
            .map_err(|e| DepositError::Storage(e.to_string()))
    }

    async fn payment_methods_by_account(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<PaymentMethodRow>> {
        let mut rows = Vec::new();
        for (_key, payment_method_id) in
            self.scan_prefix(CF_PAYMENT_METHOD_ACCOUNTS, account_id.as_bytes())?
        {
            let id = Uuid::from_slice(&payment_method_id)
                .map_err(|e| DepositError::Storage(e.to_string()))?;
            if let Some(row) = self.payment_method_by_id(id).await? {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    async fn payment_method_by_id(
        &self,
        payment_method_id: Uuid,
    ) -> Result<Option<PaymentMethodRow>> {
        let cf = self.cf(CF_PAYMENT_METHODS)?;
        let result = self
            .db
            .get_cf(cf, payment_method_id.as_bytes())
            .map_err(|e| DepositError::Storage(e.to_string()))?;
        match result {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn responses_by_payment(&self, payment_id: Uuid) -> Result<Vec<TransactionRow>> {
        self.scan_prefix(CF_RESPONSES, payment_id.as_bytes())?
            .into_iter()
            .map(|(_key, value)| serde_json::from_slice(&value).map_err(Into::into))
            .collect()
    }

    async fn responses_by_reference(&self, reference: &str) -> Result<Vec<TransactionRow>> {
        let mut prefix = Vec::with_capacity(reference.len() + 1);
        prefix.extend_from_slice(reference.as_bytes());
        prefix.push(0);

        let cf = self.cf(CF_RESPONSES)?;
        let mut rows = Vec::new();
        for (_index_key, response_key) in self.scan_prefix(CF_RESPONSE_REFERENCES, &prefix)? {
            let value = self
                .db
                .get_cf(cf, &response_key)
                .map_err(|e| DepositError::Storage(e.to_string()))?
                .ok_or_else(|| {
                    DepositError::Storage("dangling reference index entry".to_owned())
                })?;
            rows.push(serde_json::from_slice(&value)?);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deposit::{Currency, PROP_DEPOSIT_PAYMENT_REFERENCE_NUMBER};
    use crate::domain::payment::{PluginProperties, TransactionType};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_creates_column_families() {
        let dir = tempdir().unwrap();
        let ledger = RocksDbLedger::open(dir.path()).expect("failed to open rocksdb");
        for name in [
            CF_PAYMENT_METHODS,
            CF_PAYMENT_METHOD_ACCOUNTS,
            CF_RESPONSES,
            CF_RESPONSE_REFERENCES,
        ] {
            assert!(ledger.db.cf_handle(name).is_some());
        }
    }

    #[tokio::test]
    async fn test_payment_method_round_trip() {
        let dir = tempdir().unwrap();
        let ledger = RocksDbLedger::open(dir.path()).unwrap();
        let account_id = Uuid::new_v4();
        let payment_method_id = Uuid::new_v4();

        let row = PaymentMethodRow::new(
            account_id,
            payment_method_id,
            &PluginProperties::new(),
            Utc::now(),
            Uuid::new_v4(),
        )
        .unwrap();
        ledger.register_payment_method(row.clone()).await.unwrap();

        let by_account = ledger.payment_methods_by_account(account_id).await.unwrap();
        assert_eq!(by_account, vec![row.clone()]);
        let by_id = ledger
            .payment_method_by_id(payment_method_id)
            .await
            .unwrap();
        assert_eq!(by_id, Some(row));
        assert!(ledger
            .payment_methods_by_account(Uuid::new_v4())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_responses_by_payment_and_reference() {
        let dir = tempdir().unwrap();
        let ledger = RocksDbLedger::open(dir.path()).unwrap();
        let account_id = Uuid::new_v4();
        let payment_id = Uuid::new_v4();

        let properties = PluginProperties::from([(
            PROP_DEPOSIT_PAYMENT_REFERENCE_NUMBER.to_owned(),
            "WIRE-12345".to_owned(),
        )]);
        let row = TransactionRow::new(
            account_id,
            payment_id,
            Uuid::new_v4(),
            TransactionType::Purchase,
            Some(dec!(10.00)),
            Some(Currency::from("USD")),
            &properties,
            Utc::now(),
            Uuid::new_v4(),
        )
        .unwrap();
        ledger.record_transaction(row.clone()).await.unwrap();

        let by_payment = ledger.responses_by_payment(payment_id).await.unwrap();
        assert_eq!(by_payment, vec![row.clone()]);

        let by_reference = ledger.responses_by_reference("WIRE-12345").await.unwrap();
        assert_eq!(by_reference, vec![row]);
        assert!(ledger
            .responses_by_reference("OTHER")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_same_clock_reading_keeps_insertion_order() {
        let dir = tempdir().unwrap();
        let ledger = RocksDbLedger::open(dir.path()).unwrap();
        let account_id = Uuid::new_v4();
        let payment_id = Uuid::new_v4();
        let utc_now = Utc::now();

        // Transaction ids picked so byte order alone would reverse insertion
        // order; both rows share one clock reading.
        let first_tx = Uuid::from_u128(u128::MAX);
        let second_tx = Uuid::from_u128(1);
        for (tx_id, amount) in [(first_tx, dec!(1.00)), (second_tx, dec!(2.00))] {
            let row = TransactionRow::new(
                account_id,
                payment_id,
                tx_id,
                TransactionType::Purchase,
                Some(amount),
                Some(Currency::from("USD")),
                &PluginProperties::new(),
                utc_now,
                Uuid::new_v4(),
            )
            .unwrap();
            ledger.record_transaction(row).await.unwrap();
        }

        let rows = ledger.responses_by_payment(payment_id).await.unwrap();
        assert_eq!(
            rows.iter()
                .map(|row| row.payment_transaction_id)
                .collect::<Vec<_>>(),
            vec![first_tx, second_tx]
        );
    }

    #[tokio::test]
    async fn test_rows_survive_reopen() {
        let dir = tempdir().unwrap();
        let account_id = Uuid::new_v4();
        let payment_method_id = Uuid::new_v4();

        {
            let ledger = RocksDbLedger::open(dir.path()).unwrap();
            let row = PaymentMethodRow::new(
                account_id,
                payment_method_id,
                &PluginProperties::new(),
                Utc::now(),
                Uuid::new_v4(),
            )
            .unwrap();
            ledger.register_payment_method(row).await.unwrap();
        }

        let reopened = RocksDbLedger::open(dir.path()).unwrap();
        let rows = reopened
            .payment_methods_by_account(account_id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].payment_method_id, payment_method_id);
    }
}
