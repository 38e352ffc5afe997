//! Catalog repository: products and clients.
//!
//! The ledgers only read the catalog; products and clients are written by
//! the seeder and by test fixtures.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use inventra_core::catalog::{ClientInfo, ProductInfo};
use inventra_shared::types::{ClientId, ProductId, fits_money_column};

use crate::entities::{clients, products};

use super::unique_violation;

/// Error types for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    /// Client not found.
    #[error("Client not found: {0}")]
    ClientNotFound(Uuid),

    /// SKU already taken by another product.
    #[error("SKU already exists: {0}")]
    DuplicateSku(String),

    /// Input rejected.
    #[error("Invalid input: {0}")]
    Invalid(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Display name.
    pub name: String,
    /// Unique stock keeping unit.
    pub sku: String,
    /// Optional category name.
    pub category: Option<String>,
    /// Unit cost.
    pub cost_price: Decimal,
    /// Catalog selling price.
    pub selling_price: Decimal,
    /// Units in stock.
    pub quantity: i32,
    /// Low-stock threshold.
    pub reorder_level: i32,
}

/// Input for creating a client.
#[derive(Debug, Clone)]
pub struct CreateClientInput {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
}

/// Catalog repository.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    /// Creates a new catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an active product.
    ///
    /// # Errors
    ///
    /// `Invalid` for negative prices or stock, `DuplicateSku` if the SKU is taken.
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<products::Model, CatalogError> {
        if input.cost_price < Decimal::ZERO || input.selling_price < Decimal::ZERO {
            return Err(CatalogError::Invalid(format!(
                "prices of {} cannot be negative",
                input.sku
            )));
        }
        if !fits_money_column(input.cost_price) || !fits_money_column(input.selling_price) {
            return Err(CatalogError::Invalid(format!(
                "prices of {} must be whole cents within the storable range",
                input.sku
            )));
        }
        if input.quantity < 0 || input.reorder_level < 0 {
            return Err(CatalogError::Invalid(format!(
                "stock figures of {} cannot be negative",
                input.sku
            )));
        }

        let product = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            sku: Set(input.sku.clone()),
            category: Set(input.category),
            cost_price: Set(input.cost_price),
            selling_price: Set(input.selling_price),
            quantity: Set(input.quantity),
            reorder_level: Set(input.reorder_level),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };

        product.insert(&self.db).await.map_err(|e| {
            if unique_violation(&e).is_some() {
                CatalogError::DuplicateSku(input.sku)
            } else {
                CatalogError::Database(e)
            }
        })
    }

    /// Creates an active client.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the insert fails.
    pub async fn create_client(
        &self,
        input: CreateClientInput,
    ) -> Result<clients::Model, CatalogError> {
        if input.name.trim().is_empty() {
            return Err(CatalogError::Invalid("client name cannot be empty".to_string()));
        }

        let client = clients::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };

        Ok(client.insert(&self.db).await?)
    }

    /// Activates or retires a product.
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` if the product does not exist.
    pub async fn set_product_active(
        &self,
        product_id: Uuid,
        is_active: bool,
    ) -> Result<products::Model, CatalogError> {
        let product = products::Entity::find_by_id(product_id)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::ProductNotFound(product_id))?;

        let mut active: products::ActiveModel = product.into();
        active.is_active = Set(is_active);
        Ok(active.update(&self.db).await?)
    }

    /// Activates or deactivates a client.
    ///
    /// # Errors
    ///
    /// Returns `ClientNotFound` if the client does not exist.
    pub async fn set_client_active(
        &self,
        client_id: Uuid,
        is_active: bool,
    ) -> Result<clients::Model, CatalogError> {
        let client = clients::Entity::find_by_id(client_id)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::ClientNotFound(client_id))?;

        let mut active: clients::ActiveModel = client.into();
        active.is_active = Set(is_active);
        Ok(active.update(&self.db).await?)
    }

    /// Finds a product by SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_product_by_sku(
        &self,
        sku: &str,
    ) -> Result<Option<products::Model>, CatalogError> {
        Ok(products::Entity::find()
            .filter(products::Column::Sku.eq(sku))
            .one(&self.db)
            .await?)
    }

    /// Lists all products ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_products(&self) -> Result<Vec<products::Model>, CatalogError> {
        Ok(products::Entity::find()
            .order_by_asc(products::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Lists all clients ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_clients(&self) -> Result<Vec<clients::Model>, CatalogError> {
        Ok(clients::Entity::find()
            .order_by_asc(clients::Column::Name)
            .all(&self.db)
            .await?)
    }
}

/// Converts a product row into the view the ledgers read.
pub(crate) fn product_info(model: &products::Model) -> ProductInfo {
    ProductInfo {
        id: ProductId::from_uuid(model.id),
        name: model.name.clone(),
        sku: model.sku.clone(),
        category: model.category.clone(),
        cost_price: model.cost_price,
        selling_price: model.selling_price,
        quantity: model.quantity,
        reorder_level: model.reorder_level,
        is_active: model.is_active,
    }
}

/// Loads one client as the ledgers see it.
pub(crate) async fn load_client<C: ConnectionTrait>(
    conn: &C,
    client_id: ClientId,
) -> Result<Option<ClientInfo>, DbErr> {
    let client = clients::Entity::find_by_id(client_id.into_inner())
        .one(conn)
        .await?;
    Ok(client.map(|c| ClientInfo {
        id: ClientId::from_uuid(c.id),
        name: c.name,
        is_active: c.is_active,
    }))
}

/// Loads the given products, keyed by id. Unknown ids are simply absent.
pub(crate) async fn load_products<C: ConnectionTrait>(
    conn: &C,
    product_ids: &[ProductId],
) -> Result<HashMap<ProductId, ProductInfo>, DbErr> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let ids: Vec<Uuid> = product_ids.iter().map(|id| id.into_inner()).collect();
    let rows = products::Entity::find()
        .filter(products::Column::Id.is_in(ids))
        .all(conn)
        .await?;

    Ok(rows
        .iter()
        .map(|row| (ProductId::from_uuid(row.id), product_info(row)))
        .collect())
}
