//! Ledger error types for the order, invoice and payment workflow.
//!
//! Every variant carries the entity id and/or the attempted value so the
//! caller can render a user-facing message without another lookup.

use rust_decimal::Decimal;
use thiserror::Error;

use inventra_shared::AppError;
use inventra_shared::types::{
    ClientId, InvoiceId, MONEY_LIMIT, OrderId, ProductId, has_money_scale,
};

use super::order::OrderStatus;

/// Broad classification of ledger errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input, or a rule the input breaks.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// The operation collides with existing state.
    Conflict,
    /// A payment exceeds the remaining balance.
    Overpayment,
    /// Infrastructure failure.
    Internal,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// An order must contain at least one item.
    #[error("Order must have at least one item")]
    EmptyOrder,

    /// Item quantity must be a positive integer.
    #[error("Quantity for product {product_id} must be positive, got {quantity}")]
    InvalidQuantity {
        /// The product of the offending item.
        product_id: ProductId,
        /// The rejected quantity.
        quantity: i32,
    },

    /// Unit price cannot be negative.
    #[error("Unit price for product {product_id} cannot be negative, got {price}")]
    NegativePrice {
        /// The product of the offending item.
        product_id: ProductId,
        /// The rejected price.
        price: Decimal,
    },

    /// Status value is not one of the recognized values.
    #[error("Unrecognized status: {0}")]
    InvalidStatus(String),

    /// Payment method is not one of the recognized values.
    #[error("Unrecognized payment method: {0}")]
    InvalidPaymentMethod(String),

    /// The transition table forbids this status change.
    #[error("Order cannot move from {from} to {to}")]
    IllegalTransition {
        /// The current status.
        from: OrderStatus,
        /// The requested status.
        to: OrderStatus,
    },

    /// The ordering client does not exist.
    #[error("Unknown client: {0}")]
    UnknownClient(ClientId),

    /// Client is inactive and cannot place orders.
    #[error("Client {0} is inactive")]
    ClientInactive(ClientId),

    /// Product is inactive and cannot be ordered.
    #[error("Product {0} is inactive")]
    ProductInactive(ProductId),

    /// Items can only change while the order is pending or in progress.
    #[error("Items of order {order_id} cannot change while it is {status}")]
    OrderNotEditable {
        /// The order.
        order_id: OrderId,
        /// Its current status.
        status: OrderStatus,
    },

    /// Cancelled and rejected orders cannot be invoiced.
    #[error("Order {order_id} cannot be invoiced while it is {status}")]
    OrderNotInvoiceable {
        /// The order.
        order_id: OrderId,
        /// Its current status.
        status: OrderStatus,
    },

    /// Payment amount must be greater than zero.
    #[error("Payment amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Tax rate must be a percentage between 0 and 100.
    #[error("Tax rate must be between 0 and 100, got {0}")]
    InvalidTaxRate(Decimal),

    /// Discount cannot be negative.
    #[error("Discount cannot be negative, got {0}")]
    NegativeDiscount(Decimal),

    /// The discount would push the invoice total below zero.
    #[error("Invoice total cannot be negative, got {0}")]
    NegativeTotal(Decimal),

    /// An amount or rate has more decimal places than can be stored.
    #[error("{field} must have at most 2 decimal places, got {value}")]
    InvalidPrecision {
        /// Name of the offending input.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// An amount exceeds what a money column can hold.
    #[error("{field} is too large, got {value}")]
    AmountOutOfRange {
        /// Name of the offending input.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    // ========== Not Found Errors ==========
    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// Client not found.
    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The order exists but has no invoice yet.
    #[error("Order {0} has no invoice")]
    OrderNotInvoiced(OrderId),

    // ========== Conflict Errors ==========
    /// The order already has an invoice.
    #[error("Invoice {invoice_number} already exists for order {order_id}")]
    InvoiceAlreadyExists {
        /// The order.
        order_id: OrderId,
        /// Number of the existing invoice, empty if unknown.
        invoice_number: String,
    },

    /// Items of an invoiced order are frozen.
    #[error("Order {0} is already invoiced")]
    OrderAlreadyInvoiced(OrderId),

    /// A generated order or invoice number collided with an existing one.
    #[error("Document number {0} is already taken, please retry")]
    DuplicateDocumentNumber(String),

    // ========== Overpayment ==========
    /// Payment exceeds the remaining balance of the invoice.
    #[error("Payment of {amount} exceeds remaining balance {remaining} on invoice {invoice_id}")]
    Overpayment {
        /// The invoice.
        invoice_id: InvoiceId,
        /// The attempted amount.
        amount: Decimal,
        /// The balance left at the moment of the attempt.
        remaining: Decimal,
    },

    // ========== Infrastructure Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the broad classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyOrder
            | Self::InvalidQuantity { .. }
            | Self::NegativePrice { .. }
            | Self::InvalidStatus(_)
            | Self::InvalidPaymentMethod(_)
            | Self::IllegalTransition { .. }
            | Self::UnknownClient(_)
            | Self::ClientInactive(_)
            | Self::ProductInactive(_)
            | Self::OrderNotEditable { .. }
            | Self::OrderNotInvoiceable { .. }
            | Self::NonPositiveAmount(_)
            | Self::InvalidTaxRate(_)
            | Self::NegativeDiscount(_)
            | Self::NegativeTotal(_)
            | Self::InvalidPrecision { .. }
            | Self::AmountOutOfRange { .. } => ErrorKind::Validation,

            Self::OrderNotFound(_)
            | Self::InvoiceNotFound(_)
            | Self::ClientNotFound(_)
            | Self::ProductNotFound(_)
            | Self::OrderNotInvoiced(_) => ErrorKind::NotFound,

            Self::InvoiceAlreadyExists { .. }
            | Self::OrderAlreadyInvoiced(_)
            | Self::DuplicateDocumentNumber(_) => ErrorKind::Conflict,

            Self::Overpayment { .. } => ErrorKind::Overpayment,

            Self::Database(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyOrder => "empty_order",
            Self::InvalidQuantity { .. } => "invalid_quantity",
            Self::NegativePrice { .. } => "negative_price",
            Self::InvalidStatus(_) => "invalid_status",
            Self::InvalidPaymentMethod(_) => "invalid_payment_method",
            Self::IllegalTransition { .. } => "illegal_transition",
            Self::UnknownClient(_) => "unknown_client",
            Self::ClientInactive(_) => "client_inactive",
            Self::ProductInactive(_) => "product_inactive",
            Self::OrderNotEditable { .. } => "order_not_editable",
            Self::OrderNotInvoiceable { .. } => "order_not_invoiceable",
            Self::NonPositiveAmount(_) => "non_positive_amount",
            Self::InvalidTaxRate(_) => "invalid_tax_rate",
            Self::NegativeDiscount(_) => "negative_discount",
            Self::NegativeTotal(_) => "negative_total",
            Self::InvalidPrecision { .. } => "invalid_precision",
            Self::AmountOutOfRange { .. } => "amount_out_of_range",
            Self::OrderNotFound(_) => "order_not_found",
            Self::InvoiceNotFound(_) => "invoice_not_found",
            Self::ClientNotFound(_) => "client_not_found",
            Self::ProductNotFound(_) => "product_not_found",
            Self::OrderNotInvoiced(_) => "order_not_invoiced",
            Self::InvoiceAlreadyExists { .. } => "invoice_already_exists",
            Self::OrderAlreadyInvoiced(_) => "order_already_invoiced",
            Self::DuplicateDocumentNumber(_) => "duplicate_document_number",
            Self::Overpayment { .. } => "overpayment",
            Self::Database(_) | Self::Internal(_) => "internal_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Overpayment => 422,
            ErrorKind::Internal => 500,
        }
    }

    /// Returns true if repeating the same call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DuplicateDocumentNumber(_))
    }
}

/// Checks that `value` can be stored in a `DECIMAL(16, 2)` column as is.
///
/// # Errors
///
/// `InvalidPrecision` for more than two decimal places, `AmountOutOfRange`
/// when the integer part does not fit.
pub fn ensure_money(field: &'static str, value: Decimal) -> Result<(), LedgerError> {
    if !has_money_scale(value) {
        return Err(LedgerError::InvalidPrecision { field, value });
    }
    if value.abs() >= MONEY_LIMIT {
        return Err(LedgerError::AmountOutOfRange { field, value });
    }
    Ok(())
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Conflict => Self::Conflict(message),
            ErrorKind::Overpayment => Self::BusinessRule(message),
            ErrorKind::Internal => match err {
                LedgerError::Database(detail) => Self::Database(detail),
                _ => Self::Internal(message),
            },
        }
    }
}
