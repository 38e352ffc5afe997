//! Catalog seeder for Inventra development and testing.
//!
//! Seeds a product per category plus a few clients. Products whose SKU
//! already exists are skipped, so the seeder can run repeatedly.
//!
//! Usage: cargo run --bin seeder

use rust_decimal::Decimal;
use tracing::{info, warn};

use inventra_db::repositories::{
    CatalogError, CatalogRepository, CreateClientInput, CreateProductInput,
};
use inventra_shared::AppConfig;

/// (sku, name, category, cost cents, price cents, quantity, reorder level)
const PRODUCTS: [(&str, &str, &str, i64, i64, i32, i32); 9] = [
    ("ELEC-001", "USB-C Charger", "Electronics", 900, 1999, 40, 10),
    ("FURN-001", "Office Chair", "Furniture", 6500, 12900, 6, 5),
    ("CLTH-001", "Work Jacket", "Clothing", 2200, 4900, 15, 5),
    ("FOOD-001", "Coffee Beans 1kg", "Food & Beverages", 1100, 2200, 3, 8),
    ("OFFC-001", "A4 Paper Ream", "Office Supplies", 350, 699, 120, 25),
    ("TOOL-001", "Cordless Drill", "Tools & Hardware", 4800, 8900, 0, 3),
    ("BEAU-001", "Hand Cream", "Beauty & Personal Care", 250, 650, 30, 10),
    ("SPRT-001", "Yoga Mat", "Sports & Fitness", 900, 2500, 12, 4),
    ("BOOK-001", "Ruled Notebook", "Books & Stationery", 120, 399, 80, 20),
];

const CLIENTS: [(&str, &str); 3] = [
    ("Northwind Traders", "orders@northwind.example"),
    ("Contoso Retail", "buying@contoso.example"),
    ("Fabrikam Supplies", "ap@fabrikam.example"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load()?;
    info!("Connecting to database...");
    let db = inventra_db::connect_with(&config.database).await?;
    let catalog = CatalogRepository::new(db);

    seed_products(&catalog).await?;
    seed_clients(&catalog).await?;

    info!("Seeding complete!");
    Ok(())
}

/// Seeds one product per category.
async fn seed_products(catalog: &CatalogRepository) -> Result<(), CatalogError> {
    let mut inserted = 0;
    for (sku, name, category, cost, price, quantity, reorder_level) in PRODUCTS {
        if catalog.find_product_by_sku(sku).await?.is_some() {
            continue;
        }

        let input = CreateProductInput {
            name: name.to_string(),
            sku: sku.to_string(),
            category: Some(category.to_string()),
            cost_price: Decimal::new(cost, 2),
            selling_price: Decimal::new(price, 2),
            quantity,
            reorder_level,
        };

        match catalog.create_product(input).await {
            Ok(_) => inserted += 1,
            Err(CatalogError::DuplicateSku(sku)) => warn!(%sku, "Product already exists"),
            Err(e) => return Err(e),
        }
    }

    info!(inserted, "Seeded products");
    Ok(())
}

/// Seeds sample clients when none exist yet.
async fn seed_clients(catalog: &CatalogRepository) -> Result<(), CatalogError> {
    if !catalog.list_clients().await?.is_empty() {
        info!("Clients already present, skipping");
        return Ok(());
    }

    for (name, email) in CLIENTS {
        catalog
            .create_client(CreateClientInput {
                name: name.to_string(),
                email: Some(email.to_string()),
                phone: None,
            })
            .await?;
    }

    info!(inserted = CLIENTS.len(), "Seeded clients");
    Ok(())
}
