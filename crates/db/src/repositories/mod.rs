//! Repository abstractions for data access.
//!
//! Repositories load rows, hand them to the rules in `inventra-core` and
//! persist the result. Every write runs inside one [`crate::lock::WriteScope`].

pub mod catalog;
pub mod invoice;
pub mod order;
pub mod payment;
pub mod stats;

pub use catalog::{CatalogError, CatalogRepository, CreateClientInput, CreateProductInput};
pub use invoice::{CreateInvoiceInput, InvoiceRepository, InvoiceWithBalance};
pub use order::{CreateOrderInput, OrderRepository, OrderWithItems};
pub use payment::{AddPaymentInput, PaymentReceipt, PaymentRepository};
pub use stats::{StatsError, StatsRepository};

use inventra_core::ledger::LedgerError;
use sea_orm::{DbErr, SqlErr};

/// Wraps a database failure into the ledger taxonomy.
pub(crate) fn db_error(err: DbErr) -> LedgerError {
    tracing::error!(error = %err, "Database error");
    LedgerError::Database(err.to_string())
}

/// Returns the driver message if `err` is a unique constraint violation.
pub(crate) fn unique_violation(err: &DbErr) -> Option<String> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => Some(message),
        _ => None,
    }
}
