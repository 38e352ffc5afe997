//! Error mapping to HTTP responses.
//!
//! Every error body is `{"error": <code>, "message": <text>}`. Internal
//! failures are logged here and answered with a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use inventra_core::ledger::{ErrorKind, LedgerError};
use inventra_db::repositories::StatsError;

/// Builds an error response.
pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into()
        })),
    )
        .into_response()
}

fn internal_error() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "An error occurred",
    )
}

/// Maps ledger errors to HTTP responses.
pub fn map_ledger_error(e: &LedgerError) -> Response {
    match e.kind() {
        ErrorKind::Internal => {
            error!(error = %e, "Ledger operation failed");
            internal_error()
        }
        kind => {
            if kind == ErrorKind::Conflict {
                warn!(error = %e, "Ledger conflict");
            }
            let status = StatusCode::from_u16(e.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error_response(status, e.error_code(), e.to_string())
        }
    }
}

/// Maps statistics errors to HTTP responses.
pub fn map_stats_error(e: &StatsError) -> Response {
    match e {
        StatsError::InvalidArgument(message) => {
            error_response(StatusCode::BAD_REQUEST, "invalid_argument", message.clone())
        }
        StatsError::Database(db) => {
            error!(error = %db, "Statistics query failed");
            internal_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventra_shared::types::{InvoiceId, OrderId};
    use rust_decimal_macros::dec;

    #[test]
    fn test_ledger_status_codes() {
        assert_eq!(
            map_ledger_error(&LedgerError::EmptyOrder).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            map_ledger_error(&LedgerError::OrderNotFound(OrderId::new())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            map_ledger_error(&LedgerError::OrderAlreadyInvoiced(OrderId::new())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            map_ledger_error(&LedgerError::Overpayment {
                invoice_id: InvoiceId::new(),
                amount: dec!(6.00),
                remaining: dec!(5.50),
            })
            .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            map_ledger_error(&LedgerError::Database("connection reset".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_stats_status_codes() {
        assert_eq!(
            map_stats_error(&StatsError::InvalidArgument("limit".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
