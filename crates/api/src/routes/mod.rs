//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod health;
pub mod invoices;
pub mod orders;
pub mod payments;
pub mod settings;
pub mod stats;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(orders::routes())
        .merge(invoices::routes())
        .merge(payments::routes())
        .merge(stats::routes())
        .merge(settings::routes())
}
