//! Storage adapters for the ledger port and a fixture-backed host for demos
//! and tests.

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod static_host;
