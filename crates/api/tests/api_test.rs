//! End-to-end tests driving the router against in-memory SQLite.

#![allow(clippy::too_many_lines)]

use std::str::FromStr;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use inventra_api::{AppState, create_router, middleware::ACTOR_HEADER};
use inventra_db::migration::Migrator;
use inventra_db::repositories::{CatalogRepository, CreateClientInput, CreateProductInput};
use inventra_shared::AppConfig;
use inventra_shared::config::{BusinessSettings, DatabaseConfig, OrderPolicyConfig, ServerConfig};

struct TestApp {
    router: Router,
    db: DatabaseConnection,
    actor: Uuid,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
                min_connections: 1,
            },
            business: BusinessSettings::default(),
            orders: OrderPolicyConfig::default(),
        };
        let state = AppState::new(db.clone(), config).unwrap();

        Self {
            router: create_router(state),
            db,
            actor: Uuid::new_v4(),
        }
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        actor: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder.header(ACTOR_HEADER, actor.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(self.actor), Some(body))
            .await
    }

    async fn product(&self, sku: &str, price: Decimal) -> Uuid {
        CatalogRepository::new(self.db.clone())
            .create_product(CreateProductInput {
                name: format!("Product {sku}"),
                sku: sku.to_string(),
                category: Some("Tools".to_string()),
                cost_price: Decimal::ZERO,
                selling_price: price,
                quantity: 20,
                reorder_level: 5,
            })
            .await
            .unwrap()
            .id
    }

    async fn client(&self) -> Uuid {
        CatalogRepository::new(self.db.clone())
            .create_client(CreateClientInput {
                name: "Acme".to_string(),
                email: None,
                phone: None,
            })
            .await
            .unwrap()
            .id
    }

    /// Creates the reference order: 2 x 10.00 plus 1 x 5.00.
    async fn reference_order(&self) -> Uuid {
        let a = self.product("A-001", dec!(10.00)).await;
        let b = self.product("B-001", dec!(5.00)).await;
        let client = self.client().await;

        let (status, body) = self
            .post(
                "/api/v1/orders",
                json!({
                    "client_id": client,
                    "items": [
                        { "product_id": a, "quantity": 2 },
                        { "product_id": b, "quantity": 1, "unit_price": "5.00" }
                    ]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(decimal(&body["subtotal"]), dec!(25.00));
        Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
    }
}

fn decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_mutations_require_actor() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            None,
            Some(json!({ "client_id": Uuid::new_v4(), "items": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_actor");
}

#[tokio::test]
async fn test_settlement_flow() {
    let app = TestApp::new().await;
    let order_id = app.reference_order().await;

    let (status, invoice) = app
        .post(
            &format!("/api/v1/orders/{order_id}/invoice"),
            json!({ "tax_rate": "10", "discount": "2.00" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{invoice}");
    assert_eq!(decimal(&invoice["total_amount"]), dec!(25.50));
    assert_eq!(invoice["status"], "pending");
    let invoice_id = invoice["id"].as_str().unwrap().to_string();
    let payments_uri = format!("/api/v1/invoices/{invoice_id}/payments");

    let (status, receipt) = app
        .post(&payments_uri, json!({ "amount": "20.00", "method": "cash" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert_eq!(decimal(&receipt["remaining"]), dec!(5.50));
    assert_eq!(receipt["invoice_status"], "partially_paid");

    let (status, error) = app
        .post(&payments_uri, json!({ "amount": "6.00", "method": "cash" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["error"], "overpayment");

    let (status, receipt) = app
        .post(
            &payments_uri,
            json!({ "amount": "5.50", "method": "Bank Transfer", "reference": "TRX-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert_eq!(decimal(&receipt["remaining"]), Decimal::ZERO);
    assert_eq!(receipt["invoice_status"], "paid");
    assert_eq!(receipt["payment"]["method"], "bank_transfer");

    let (status, detail) = app.get(&format!("/api/v1/invoices/{invoice_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["is_settled"], true);
    assert_eq!(detail["payments"].as_array().unwrap().len(), 2);

    let (status, by_order) = app.get(&format!("/api/v1/orders/{order_id}/invoice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_order["id"].as_str().unwrap(), invoice_id);

    let (status, listed) = app.get(&payments_uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invoice_conflicts() {
    let app = TestApp::new().await;
    let order_id = app.reference_order().await;
    let invoice_uri = format!("/api/v1/orders/{order_id}/invoice");

    let (status, _) = app.post(&invoice_uri, json!({})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post(&invoice_uri, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invoice_already_exists");

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/v1/orders/{order_id}/items"),
            Some(app.actor),
            Some(json!({ "items": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "order_already_invoiced");

    let (status, page) = app.get("/api/v1/invoices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["total"], 1);
}

#[tokio::test]
async fn test_status_updates() {
    let app = TestApp::new().await;
    let order_id = app.reference_order().await;
    let status_uri = format!("/api/v1/orders/{order_id}/status");

    let (status, body) = app
        .request(
            Method::PATCH,
            &status_uri,
            Some(app.actor),
            Some(json!({ "status": "IN-PROGRESS" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "in_progress");
    assert_eq!(body["status_label"], "In Progress");

    let (status, body) = app
        .request(
            Method::PATCH,
            &status_uri,
            Some(app.actor),
            Some(json!({ "status": "shipped" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_status");

    app.request(
        Method::PATCH,
        &status_uri,
        Some(app.actor),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    let (status, body) = app
        .request(
            Method::PATCH,
            &status_uri,
            Some(app.actor),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "illegal_transition");
}

#[tokio::test]
async fn test_not_found_and_validation_errors() {
    let app = TestApp::new().await;

    let (status, body) = app.get(&format!("/api/v1/orders/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "order_not_found");

    let client = app.client().await;
    let (status, body) = app
        .post("/api/v1/orders", json!({ "client_id": client, "items": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "empty_order");

    let (status, body) = app
        .post(
            "/api/v1/orders",
            json!({
                "client_id": Uuid::new_v4(),
                "items": [{ "product_id": Uuid::new_v4(), "quantity": 1 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown_client");

    let order_id = app.reference_order().await;
    let (_, invoice) = app
        .post(&format!("/api/v1/orders/{order_id}/invoice"), json!({}))
        .await;
    let invoice_id = invoice["id"].as_str().unwrap();
    let (status, body) = app
        .post(
            &format!("/api/v1/invoices/{invoice_id}/payments"),
            json!({ "amount": "1.00", "method": "barter" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_payment_method");

    let (status, body) = app
        .post(
            &format!("/api/v1/invoices/{invoice_id}/payments"),
            json!({ "amount": "0.001", "method": "cash" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_precision");
}

#[tokio::test]
async fn test_order_listing() {
    let app = TestApp::new().await;
    app.reference_order().await;

    let (status, page) = app.get("/api/v1/orders?page=1&per_page=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["total"], 1);
    assert_eq!(page["data"][0]["items"].as_array().unwrap().len(), 2);
    assert!(
        page["data"][0]["order_number"]
            .as_str()
            .unwrap()
            .starts_with("ORD-")
    );
}

#[tokio::test]
async fn test_stats_endpoints() {
    let app = TestApp::new().await;

    let (status, dashboard) = app.get("/api/v1/stats/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_products"], 0);

    let (status, series) = app.get("/api/v1/stats/monthly-sales?year=2020").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(series["data"].as_array().unwrap().len(), 12);
    assert_eq!(series["labels"][11], "December");

    let (status, body) = app.get("/api/v1/stats/top-products?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_argument");

    for uri in [
        "/api/v1/stats/top-products",
        "/api/v1/stats/low-stock",
        "/api/v1/stats/payments",
        "/api/v1/stats/overview?period=90",
    ] {
        let (status, _) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn test_settings() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/v1/settings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company_name"], "My Company");
    assert_eq!(body["default_currency"], "USD");
    assert_eq!(body["transition_policy"], "strict");
}
