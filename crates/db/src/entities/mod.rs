//! `SeaORM` entities.

pub mod prelude;

pub mod clients;
pub mod invoices;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod products;
pub mod sea_orm_active_enums;
