//! Aggregation engine for dashboards and statistics.
//!
//! Read-only folds over snapshots of the catalog and the three ledgers.
//! The database layer loads the snapshots; this module only computes.

pub mod service;
pub mod types;


pub use service::{
    DEFAULT_PERIOD_DAYS, DEFAULT_TOP_LIMIT, LOW_STOCK_LIST_LIMIT, MONTH_NAMES, OVERVIEW_TOP_LIMIT,
    StatsService, UNCATEGORIZED,
};
pub use types::*;
