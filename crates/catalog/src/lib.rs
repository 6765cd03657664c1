//! Catalog domain module.
//!
//! This crate owns the product catalog and its per-item stock counters,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage).

pub mod catalog;

pub use catalog::{Catalog, CatalogEntry};
