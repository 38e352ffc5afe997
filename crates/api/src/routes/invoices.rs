//! Invoice routes: invoicing orders and reading balances.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::map_ledger_error, middleware::Actor, routes::payments::PaymentResponse};
use inventra_core::ledger::InvoiceStatus;
use inventra_db::entities::invoices;
use inventra_db::repositories::{CreateInvoiceInput, InvoiceWithBalance};
use inventra_shared::types::PageRequest;

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/orders/{order_id}/invoice",
            get(get_invoice_for_order).post(create_invoice),
        )
        .route("/invoices", get(list_invoices))
        .route("/invoices/{invoice_id}", get(get_invoice))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for invoicing an order.
#[derive(Debug, Default, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Tax percentage (0-100); the configured default when omitted.
    pub tax_rate: Option<Decimal>,
    /// Absolute discount; zero when omitted.
    pub discount: Option<Decimal>,
    /// Optional notes.
    pub notes: Option<String>,
}

/// Response for an invoice.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    /// Invoice ID.
    pub id: Uuid,
    /// Human-readable invoice number.
    pub invoice_number: String,
    /// Invoiced order.
    pub order_id: Uuid,
    /// Order subtotal at invoicing time.
    pub subtotal: Decimal,
    /// Tax percentage.
    pub tax_rate: Decimal,
    /// Absolute discount.
    pub discount: Decimal,
    /// Amount due.
    pub total_amount: Decimal,
    /// Settlement status.
    pub status: InvoiceStatus,
    /// Notes.
    pub notes: Option<String>,
    /// Created by user ID.
    pub created_by: Uuid,
    /// Issue timestamp.
    pub issued_at: String,
}

impl From<invoices::Model> for InvoiceResponse {
    fn from(invoice: invoices::Model) -> Self {
        Self {
            id: invoice.id,
            invoice_number: invoice.invoice_number,
            order_id: invoice.order_id,
            subtotal: invoice.subtotal,
            tax_rate: invoice.tax_rate,
            discount: invoice.discount,
            total_amount: invoice.total_amount,
            status: invoice.status.into(),
            notes: invoice.notes,
            created_by: invoice.created_by,
            issued_at: invoice.issued_at.to_rfc3339(),
        }
    }
}

/// Response for an invoice with its balance.
#[derive(Debug, Serialize)]
pub struct InvoiceBalanceResponse {
    /// The invoice.
    #[serde(flatten)]
    pub invoice: InvoiceResponse,
    /// Sum of recorded payments.
    pub total_paid: Decimal,
    /// Amount still due.
    pub remaining: Decimal,
    /// True when nothing remains to be paid.
    pub is_settled: bool,
    /// Recorded payments, latest first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<PaymentResponse>>,
}

impl From<InvoiceWithBalance> for InvoiceBalanceResponse {
    fn from(value: InvoiceWithBalance) -> Self {
        Self {
            invoice: value.invoice.into(),
            total_paid: value.total_paid,
            remaining: value.remaining,
            is_settled: value.is_settled,
            payments: None,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/orders/{order_id}/invoice` - Issue the invoice of an order.
async fn create_invoice(
    State(state): State<AppState>,
    actor: Actor,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> impl IntoResponse {
    let input = CreateInvoiceInput {
        order_id,
        tax_rate: payload.tax_rate,
        discount: payload.discount,
        notes: payload.notes,
        created_by: actor.user_id(),
    };

    match state.invoices().create_invoice(input).await {
        Ok(invoice) => (StatusCode::CREATED, Json(InvoiceResponse::from(invoice))).into_response(),
        Err(e) => map_ledger_error(&e),
    }
}

/// GET `/orders/{order_id}/invoice` - Get the invoice of an order.
async fn get_invoice_for_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.invoices().get_invoice_for_order(order_id).await {
        Ok(invoice) => {
            (StatusCode::OK, Json(InvoiceBalanceResponse::from(invoice))).into_response()
        }
        Err(e) => map_ledger_error(&e),
    }
}

/// GET `/invoices` - List invoices, most recently issued first.
async fn list_invoices(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    match state.invoices().list_invoices(page).await {
        Ok(invoices) => {
            (StatusCode::OK, Json(invoices.map(InvoiceResponse::from))).into_response()
        }
        Err(e) => map_ledger_error(&e),
    }
}

/// GET `/invoices/{invoice_id}` - Get an invoice with its balance and payments.
async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let invoice = match state.invoices().get_invoice_with_balance(invoice_id).await {
        Ok(invoice) => invoice,
        Err(e) => return map_ledger_error(&e),
    };

    let payments = match state.payments().list_payments(invoice_id).await {
        Ok(payments) => payments,
        Err(e) => return map_ledger_error(&e),
    };

    let mut response = InvoiceBalanceResponse::from(invoice);
    response.payments = Some(payments.into_iter().map(PaymentResponse::from).collect());
    (StatusCode::OK, Json(response)).into_response()
}
