//! Domain model: loan value objects, the amortization engine and the
//! storage ports the application layer depends on.

pub mod amortization;
pub mod loan;
pub mod money;
pub mod ports;
