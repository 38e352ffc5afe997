//! Shared fixtures for database integration tests.
//!
//! Every test gets its own in-memory SQLite database with the real migration
//! applied, so tests never see each other's rows.

#![allow(dead_code)]

use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use inventra_core::ledger::OrderItemInput;
use inventra_db::entities::{clients, products};
use inventra_db::migration::Migrator;
use inventra_db::repositories::{
    CatalogRepository, CreateClientInput, CreateOrderInput, CreateProductInput,
};
use inventra_shared::types::ProductId;

/// Opens a fresh in-memory database and runs all migrations.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    Migrator::up(&db, None).await.expect("migrations");
    db
}

/// Creates an active product with the given selling price and stock figures.
pub async fn product(
    db: &DatabaseConnection,
    sku: &str,
    category: Option<&str>,
    selling_price: Decimal,
    quantity: i32,
    reorder_level: i32,
) -> products::Model {
    CatalogRepository::new(db.clone())
        .create_product(CreateProductInput {
            name: format!("Product {sku}"),
            sku: sku.to_string(),
            category: category.map(str::to_string),
            cost_price: Decimal::ZERO,
            selling_price,
            quantity,
            reorder_level,
        })
        .await
        .expect("create product")
}

/// Creates an active client.
pub async fn client(db: &DatabaseConnection, name: &str) -> clients::Model {
    CatalogRepository::new(db.clone())
        .create_client(CreateClientInput {
            name: name.to_string(),
            email: None,
            phone: None,
        })
        .await
        .expect("create client")
}

/// An item taking the catalog price.
pub fn item(product: &products::Model, quantity: i32) -> OrderItemInput {
    OrderItemInput {
        product_id: ProductId::from_uuid(product.id),
        quantity,
        unit_price: None,
    }
}

/// An item with an explicit unit price.
pub fn priced_item(product: &products::Model, quantity: i32, unit_price: Decimal) -> OrderItemInput {
    OrderItemInput {
        product_id: ProductId::from_uuid(product.id),
        quantity,
        unit_price: Some(unit_price),
    }
}

/// Order creation input for `client` with the given items.
pub fn order_input(client: &clients::Model, items: Vec<OrderItemInput>) -> CreateOrderInput {
    CreateOrderInput {
        client_id: client.id,
        notes: None,
        items,
        created_by: Uuid::new_v4(),
    }
}
