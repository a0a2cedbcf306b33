//! Inbound call surface: header handling, call-context construction and the
//! mapping from engine failures to response categories.

pub mod api;
