//! Domain model: deposit requests, ledger rows, tenant configuration and the
//! capability ports the engine consumes.

pub mod config;
pub mod deposit;
pub mod payment;
pub mod ports;
