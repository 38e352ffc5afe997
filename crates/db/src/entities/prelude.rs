//! `SeaORM` entity prelude.

pub use super::clients::Entity as Clients;
pub use super::invoices::Entity as Invoices;
pub use super::order_items::Entity as OrderItems;
pub use super::orders::Entity as Orders;
pub use super::payments::Entity as Payments;
pub use super::products::Entity as Products;
