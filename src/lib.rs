pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;

/// Fixed plugin identity under which both capability surfaces register.
/// Payment methods created by the engine are scoped to this name.
pub const PLUGIN_NAME: &str = "deposit-engine";
