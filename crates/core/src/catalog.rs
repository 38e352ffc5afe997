//! Catalog and party references.
//!
//! The ledgers never write products or clients. They receive these
//! read-only views through lookup closures supplied by the caller.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inventra_shared::types::{ClientId, ProductId};

/// Read-only view of a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    /// The product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Stock keeping unit.
    pub sku: String,
    /// Category name, if any.
    pub category: Option<String>,
    /// Unit cost used for stock valuation.
    pub cost_price: Decimal,
    /// Current selling price, used when an order item omits its price.
    pub selling_price: Decimal,
    /// Units in stock.
    pub quantity: i32,
    /// Stock level at or below which the product needs reordering.
    pub reorder_level: i32,
    /// Whether the product can be ordered.
    pub is_active: bool,
}

impl ProductInfo {
    /// Returns true if the stock is at or below the reorder level.
    #[must_use]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_level
    }

    /// Returns true if the product is out of stock.
    #[must_use]
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity <= 0
    }

    /// Value of the stock on hand at cost.
    #[must_use]
    pub fn stock_value(&self) -> Decimal {
        Decimal::from(self.quantity) * self.cost_price
    }
}

/// Read-only view of a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// The client ID.
    pub id: ClientId,
    /// Display name.
    pub name: String,
    /// Whether the client can place orders.
    pub is_active: bool,
}
