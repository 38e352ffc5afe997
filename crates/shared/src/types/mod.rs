//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{
    Currency, MONEY_LIMIT, MONEY_SCALE, fits_money_column, has_money_scale, percent_of, round_money,
};
pub use pagination::{PageMeta, PageRequest, PageResponse};
