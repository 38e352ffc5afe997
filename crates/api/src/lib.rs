//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - REST API routes for orders, invoices, payments and statistics
//! - The acting-user extractor
//! - Error-to-response mapping

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use inventra_db::{InvoiceRepository, OrderRepository, PaymentRepository, StatsRepository};
use inventra_shared::{AppConfig, AppError};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Business timezone resolved from the configuration.
    pub tz: Tz,
}

impl AppState {
    /// Builds the state, resolving the configured timezone once.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown timezone.
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Result<Self, AppError> {
        let tz = config.business.tz()?;
        Ok(Self {
            db: Arc::new(db),
            config: Arc::new(config),
            tz,
        })
    }

    /// Order repository configured with the transition policy and timezone.
    #[must_use]
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new((*self.db).clone())
            .with_policy(self.config.orders.transition_policy)
            .with_timezone(self.tz)
    }

    /// Invoice repository configured with the default tax rate and timezone.
    #[must_use]
    pub fn invoices(&self) -> InvoiceRepository {
        InvoiceRepository::new((*self.db).clone())
            .with_default_tax_rate(self.config.business.default_tax_rate)
            .with_timezone(self.tz)
    }

    /// Payment repository.
    #[must_use]
    pub fn payments(&self) -> PaymentRepository {
        PaymentRepository::new((*self.db).clone())
    }

    /// Stats repository bucketing dates in the business timezone.
    #[must_use]
    pub fn stats(&self) -> StatsRepository {
        StatsRepository::new((*self.db).clone()).with_timezone(self.tz)
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
