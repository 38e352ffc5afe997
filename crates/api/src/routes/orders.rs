//! Order routes: intake, status changes and item edits.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::map_ledger_error, middleware::Actor};
use inventra_core::ledger::{OrderItemInput, OrderStatus};
use inventra_db::entities::order_items;
use inventra_db::repositories::{CreateOrderInput, OrderWithItems};
use inventra_shared::types::{PageRequest, ProductId};

/// Creates the order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{order_id}", get(get_order))
        .route("/orders/{order_id}/status", patch(update_status))
        .route("/orders/{order_id}/items", put(replace_items))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// One requested order item.
#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    /// Product ID.
    pub product_id: Uuid,
    /// Units ordered.
    pub quantity: i32,
    /// Unit price; the catalog price when omitted.
    pub unit_price: Option<Decimal>,
}

impl From<&OrderItemRequest> for OrderItemInput {
    fn from(item: &OrderItemRequest) -> Self {
        Self {
            product_id: ProductId::from_uuid(item.product_id),
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// Request body for creating an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Ordering client.
    pub client_id: Uuid,
    /// Optional notes.
    pub notes: Option<String>,
    /// Items in display order.
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target status, e.g. `in_progress`.
    pub status: String,
}

/// Request body for replacing the items of an order.
#[derive(Debug, Deserialize)]
pub struct ReplaceItemsRequest {
    /// New items in display order.
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

/// Response for an order item.
#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    /// Item ID.
    pub id: Uuid,
    /// Product ID.
    pub product_id: Uuid,
    /// Units ordered.
    pub quantity: i32,
    /// Unit price captured at order time.
    pub unit_price: Decimal,
    /// Quantity times unit price.
    pub line_total: Decimal,
}

impl From<order_items::Model> for OrderItemResponse {
    fn from(item: order_items::Model) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            line_total: Decimal::from(item.quantity) * item.unit_price,
            unit_price: item.unit_price,
        }
    }
}

/// Response for an order.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Order ID.
    pub id: Uuid,
    /// Human-readable order number.
    pub order_number: String,
    /// Ordering client.
    pub client_id: Uuid,
    /// Status.
    pub status: OrderStatus,
    /// Display label of the status.
    pub status_label: &'static str,
    /// Notes.
    pub notes: Option<String>,
    /// Created by user ID.
    pub created_by: Uuid,
    /// Order timestamp.
    pub ordered_at: String,
    /// Last update timestamp.
    pub updated_at: String,
    /// Items in display order.
    pub items: Vec<OrderItemResponse>,
    /// Sum of line totals.
    pub subtotal: Decimal,
}

impl From<OrderWithItems> for OrderResponse {
    fn from(value: OrderWithItems) -> Self {
        let order = value.order;
        let status = OrderStatus::from(order.status);
        Self {
            id: order.id,
            order_number: order.order_number,
            client_id: order.client_id,
            status,
            status_label: status.label(),
            notes: order.notes,
            created_by: order.created_by,
            ordered_at: order.ordered_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
            items: value.items.into_iter().map(Into::into).collect(),
            subtotal: value.subtotal,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/orders` - List orders, newest first.
async fn list_orders(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    match state.orders().list_orders(page).await {
        Ok(orders) => (StatusCode::OK, Json(orders.map(OrderResponse::from))).into_response(),
        Err(e) => map_ledger_error(&e),
    }
}

/// POST `/orders` - Create a pending order.
async fn create_order(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateOrderRequest>,
) -> impl IntoResponse {
    let input = CreateOrderInput {
        client_id: payload.client_id,
        notes: payload.notes,
        items: payload.items.iter().map(Into::into).collect(),
        created_by: actor.user_id(),
    };

    match state.orders().create_order(input).await {
        Ok(order) => (StatusCode::CREATED, Json(OrderResponse::from(order))).into_response(),
        Err(e) => map_ledger_error(&e),
    }
}

/// GET `/orders/{order_id}` - Get an order with its items.
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.orders().get_order(order_id).await {
        Ok(order) => (StatusCode::OK, Json(OrderResponse::from(order))).into_response(),
        Err(e) => map_ledger_error(&e),
    }
}

/// PATCH `/orders/{order_id}/status` - Move an order to a new status.
async fn update_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> impl IntoResponse {
    match state
        .orders()
        .update_status(order_id, &payload.status, actor.user_id())
        .await
    {
        Ok(order) => (StatusCode::OK, Json(OrderResponse::from(order))).into_response(),
        Err(e) => map_ledger_error(&e),
    }
}

/// PUT `/orders/{order_id}/items` - Replace the items of an uninvoiced order.
async fn replace_items(
    State(state): State<AppState>,
    actor: Actor,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<ReplaceItemsRequest>,
) -> impl IntoResponse {
    let items = payload.items.iter().map(Into::into).collect();

    match state
        .orders()
        .replace_items(order_id, items, actor.user_id())
        .await
    {
        Ok(order) => (StatusCode::OK, Json(OrderResponse::from(order))).into_response(),
        Err(e) => map_ledger_error(&e),
    }
}
