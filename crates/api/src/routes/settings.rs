//! Business settings route.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;
use inventra_shared::{BusinessSettings, TransitionPolicy};

/// Response for the settings endpoint.
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    /// Company and invoicing defaults.
    #[serde(flatten)]
    pub business: BusinessSettings,
    /// Active order transition policy.
    pub transition_policy: TransitionPolicy,
}

/// GET `/settings` - The typed business settings in effect.
async fn get_settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    Json(SettingsResponse {
        business: state.config.business.clone(),
        transition_policy: state.config.orders.transition_policy,
    })
}

/// Creates the settings routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings))
}
