//! Statistics routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Datelike;
use serde::Deserialize;

use crate::{AppState, error::map_stats_error};
use inventra_core::stats::{DEFAULT_PERIOD_DAYS, DEFAULT_TOP_LIMIT};

/// Creates the statistics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats/dashboard", get(get_dashboard))
        .route("/stats/monthly-sales", get(get_monthly_sales))
        .route("/stats/top-products", get(get_top_products))
        .route("/stats/low-stock", get(get_low_stock))
        .route("/stats/payments", get(get_payment_stats))
        .route("/stats/overview", get(get_overview))
}

/// Query parameters for the monthly series.
#[derive(Debug, Deserialize)]
pub struct MonthlySalesQuery {
    /// Calendar year; the current year when omitted.
    pub year: Option<i32>,
}

/// Query parameters for the top sellers.
#[derive(Debug, Deserialize)]
pub struct TopProductsQuery {
    /// Number of products (default: 5).
    pub limit: Option<usize>,
    /// Window in days (default: 30).
    pub period: Option<u32>,
}

/// Query parameters for the statistics page.
#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    /// Window in days (default: 30).
    pub period: Option<u32>,
}

/// GET `/stats/dashboard`
async fn get_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.stats();
    match stats.dashboard(stats.today()).await {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(e) => map_stats_error(&e),
    }
}

/// GET `/stats/monthly-sales?year=`
async fn get_monthly_sales(
    State(state): State<AppState>,
    Query(query): Query<MonthlySalesQuery>,
) -> impl IntoResponse {
    let stats = state.stats();
    let year = query.year.unwrap_or_else(|| stats.today().year());
    match stats.monthly_sales(year).await {
        Ok(series) => (StatusCode::OK, Json(series)).into_response(),
        Err(e) => map_stats_error(&e),
    }
}

/// GET `/stats/top-products?limit=&period=`
async fn get_top_products(
    State(state): State<AppState>,
    Query(query): Query<TopProductsQuery>,
) -> impl IntoResponse {
    let stats = state.stats();
    match stats
        .top_products(
            query.limit.unwrap_or(DEFAULT_TOP_LIMIT),
            query.period.unwrap_or(DEFAULT_PERIOD_DAYS),
            stats.today(),
        )
        .await
    {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(e) => map_stats_error(&e),
    }
}

/// GET `/stats/low-stock`
async fn get_low_stock(State(state): State<AppState>) -> impl IntoResponse {
    match state.stats().low_stock().await {
        Ok(low) => (StatusCode::OK, Json(low)).into_response(),
        Err(e) => map_stats_error(&e),
    }
}

/// GET `/stats/payments`
async fn get_payment_stats(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.stats();
    match stats.payment_stats(stats.today()).await {
        Ok(payments) => (StatusCode::OK, Json(payments)).into_response(),
        Err(e) => map_stats_error(&e),
    }
}

/// GET `/stats/overview?period=`
async fn get_overview(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> impl IntoResponse {
    let stats = state.stats();
    match stats
        .overview(query.period.unwrap_or(DEFAULT_PERIOD_DAYS), stats.today())
        .await
    {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(e) => map_stats_error(&e),
    }
}
