//! Adapters between external formats and the domain model.

pub mod csv;
