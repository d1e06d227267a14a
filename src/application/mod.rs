//! Application layer orchestrating the amortization engine and the stores.
//!
//! `LoanService` is the single entry point used by the CLI for both
//! simulation and origination.

pub mod service;
