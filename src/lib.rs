//! PICKS — NBA betting ledger normalizer and performance dashboard
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod source;
pub mod normalizer;
pub mod aggregate;
pub mod session;
pub mod store;
pub mod storage;
pub mod dashboard;
