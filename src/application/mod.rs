//! Application layer: the threshold control hook, the payment provider
//! surface over the ledger, and the deposit distributor that orchestrates a
//! batch of invoice allocations.

pub mod control;
pub mod distributor;
pub mod pipeline;
pub mod provider;
