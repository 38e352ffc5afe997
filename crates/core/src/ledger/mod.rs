//! Order, invoice and payment settlement rules.
//!
//! - `order` - order status, line items and subtotals
//! - `transition` - order status transition table
//! - `invoice` - invoice totals, settlement status and balances
//! - `payment` - payment methods and the over-payment guard
//! - `numbering` - human-readable document numbers
//! - `error` - ledger error taxonomy

pub mod error;
pub mod invoice;
pub mod numbering;
pub mod order;
pub mod payment;
pub mod transition;

#[cfg(test)]
mod service_props;

pub use error::{ErrorKind, LedgerError, ensure_money};
pub use inventra_shared::TransitionPolicy;
pub use invoice::{InvoiceBalance, InvoiceService, InvoiceStatus, InvoiceTerms, InvoiceTotals};
pub use numbering::{DocumentKind, document_number};
pub use order::{OrderItemInput, OrderLine, OrderService, OrderStatus};
pub use payment::{PaymentMethod, PaymentOutcome, PaymentService};
pub use transition::{OrderTransitions, StatusChange};
