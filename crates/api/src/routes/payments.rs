//! Payment routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::map_ledger_error, middleware::Actor};
use inventra_core::ledger::{InvoiceStatus, PaymentMethod};
use inventra_db::entities::payments;
use inventra_db::repositories::AddPaymentInput;

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/invoices/{invoice_id}/payments",
        get(list_payments).post(add_payment),
    )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct AddPaymentRequest {
    /// Amount paid.
    pub amount: Decimal,
    /// Payment method, e.g. `cash` or `bank_transfer`.
    pub method: String,
    /// External reference.
    pub reference: Option<String>,
    /// Optional notes.
    pub notes: Option<String>,
    /// Date received (YYYY-MM-DD); today's business date when omitted.
    pub payment_date: Option<NaiveDate>,
}

/// Response for a payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Paid invoice.
    pub invoice_id: Uuid,
    /// Amount paid.
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// External reference.
    pub reference: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Date received.
    pub payment_date: NaiveDate,
    /// Created by user ID.
    pub created_by: Uuid,
    /// Created at timestamp.
    pub created_at: String,
}

impl From<payments::Model> for PaymentResponse {
    fn from(payment: payments::Model) -> Self {
        Self {
            id: payment.id,
            invoice_id: payment.invoice_id,
            amount: payment.amount,
            method: payment.method.into(),
            reference: payment.reference,
            notes: payment.notes,
            payment_date: payment.payment_date,
            created_by: payment.created_by,
            created_at: payment.created_at.to_rfc3339(),
        }
    }
}

/// Response for a recorded payment.
#[derive(Debug, Serialize)]
pub struct PaymentReceiptResponse {
    /// The payment.
    pub payment: PaymentResponse,
    /// Invoice total.
    pub total_amount: Decimal,
    /// Sum of payments including this one.
    pub total_paid: Decimal,
    /// Amount still due.
    pub remaining: Decimal,
    /// Invoice status after the payment.
    pub invoice_status: InvoiceStatus,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/invoices/{invoice_id}/payments` - List payments, latest first.
async fn list_payments(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.payments().list_payments(invoice_id).await {
        Ok(payments) => {
            let items: Vec<PaymentResponse> =
                payments.into_iter().map(PaymentResponse::from).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => map_ledger_error(&e),
    }
}

/// POST `/invoices/{invoice_id}/payments` - Record a payment.
async fn add_payment(
    State(state): State<AppState>,
    actor: Actor,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<AddPaymentRequest>,
) -> impl IntoResponse {
    let method = match PaymentMethod::parse_or_err(&payload.method) {
        Ok(method) => method,
        Err(e) => return map_ledger_error(&e),
    };

    let input = AddPaymentInput {
        invoice_id,
        amount: payload.amount,
        method,
        reference: payload.reference,
        notes: payload.notes,
        payment_date: payload
            .payment_date
            .unwrap_or_else(|| Utc::now().with_timezone(&state.tz).date_naive()),
        created_by: actor.user_id(),
    };

    match state.payments().add_payment(input).await {
        Ok(receipt) => {
            let response = PaymentReceiptResponse {
                payment: receipt.payment.into(),
                total_amount: receipt.balance.total_amount,
                total_paid: receipt.balance.total_paid,
                remaining: receipt.balance.remaining,
                invoice_status: receipt.invoice_status,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => map_ledger_error(&e),
    }
}
