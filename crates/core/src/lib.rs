//! Core business logic for Inventra.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `catalog` - Read-only views of products and clients consumed by the ledgers
//! - `ledger` - Order, invoice and payment rules (the settlement workflow)
//! - `stats` - Aggregation engine for dashboards and statistics

pub mod catalog;
pub mod ledger;
pub mod stats;
