//! Aggregation engine inputs and outputs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inventra_shared::types::{InvoiceId, OrderId, ProductId};

use crate::catalog::ProductInfo;
use crate::ledger::{InvoiceStatus, OrderLine, OrderService, OrderStatus};

/// An order as seen by the aggregation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSnapshot {
    /// Order ID.
    pub id: OrderId,
    /// Current status.
    pub status: OrderStatus,
    /// Business date of `ordered_at`.
    pub ordered_on: NaiveDate,
    /// Line items.
    pub items: Vec<OrderLine>,
}

impl OrderSnapshot {
    /// Sum of the line totals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        OrderService::subtotal(&self.items)
    }

    /// Returns true if the order counts toward sales.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }
}

/// An invoice as seen by the aggregation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceSnapshot {
    /// Invoice ID.
    pub id: InvoiceId,
    /// Persisted settlement status.
    pub status: InvoiceStatus,
    /// Amount due.
    pub total_amount: Decimal,
}

/// A payment as seen by the aggregation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentSnapshot {
    /// Invoice the payment settles.
    pub invoice_id: InvoiceId,
    /// Amount paid.
    pub amount: Decimal,
    /// Payment date.
    pub payment_date: NaiveDate,
}

/// Everything the aggregation engine reads.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    /// Whole catalog, active and inactive.
    pub products: Vec<ProductInfo>,
    /// All orders with items.
    pub orders: Vec<OrderSnapshot>,
    /// All invoices.
    pub invoices: Vec<InvoiceSnapshot>,
    /// All payments.
    pub payments: Vec<PaymentSnapshot>,
}

/// Home dashboard figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Number of products in the catalog.
    pub total_products: u64,
    /// Active products at or below their reorder level.
    pub low_stock_count: u64,
    /// Σ quantity × cost price.
    pub stock_value: Decimal,
    /// Orders dated today, any status.
    pub today_orders: u64,
    /// Orders dated this month, any status.
    pub orders_this_month: u64,
    /// Completed sales dated today.
    pub today_sales: Decimal,
    /// Completed sales dated this month.
    pub monthly_sales: Decimal,
}

/// Twelve-month sales series for a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySalesSeries {
    /// Year covered.
    pub year: i32,
    /// English month names, January first.
    pub labels: Vec<String>,
    /// Completed sales per month.
    pub data: Vec<Decimal>,
}

/// A best-selling product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopProduct {
    /// Product ID.
    pub product_id: ProductId,
    /// Product name.
    pub name: String,
    /// Product SKU.
    pub sku: String,
    /// Units sold in the window.
    pub total_quantity: i64,
    /// Sales in the window.
    pub total_sales: Decimal,
}

/// A product at or below its reorder level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockProduct {
    /// Product ID.
    pub product_id: ProductId,
    /// Product name.
    pub name: String,
    /// Product SKU.
    pub sku: String,
    /// Units in stock.
    pub quantity: i32,
    /// Reorder threshold.
    pub reorder_level: i32,
}

/// Low-stock overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockStats {
    /// Up to ten low-stock products, lowest quantity first.
    pub products: Vec<LowStockProduct>,
    /// Number of low-stock products.
    pub total_low_stock: u64,
    /// Products with nothing left.
    pub critical_stock: u64,
    /// Products with some stock left at or below the reorder level.
    pub warning_stock: u64,
}

/// Invoice settlement overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStats {
    /// Number of invoices.
    pub total_invoices: u64,
    /// Invoices not settled yet (pending or partially paid).
    pub pending_invoices: u64,
    /// Partially paid invoices.
    pub partially_paid_invoices: u64,
    /// Settled invoices.
    pub paid_invoices: u64,
    /// Paid invoices as a percentage of all invoices.
    pub payment_rate: Decimal,
    /// Payments dated in the current month.
    pub month_payments: Decimal,
}

/// Order and revenue overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesStats {
    /// Number of orders.
    pub total_orders: u64,
    /// Orders dated inside the period.
    pub period_orders: u64,
    /// Completed orders.
    pub completed_orders: u64,
    /// Completed orders as a percentage of all orders.
    pub completion_rate: Decimal,
    /// Completed sales.
    pub total_sales: Decimal,
    /// Completed sales dated inside the period.
    pub period_sales: Decimal,
    /// Completed sales per completed order.
    pub avg_order_value: Decimal,
}

/// Catalog overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStats {
    /// Number of products.
    pub total_products: u64,
    /// Active products.
    pub active_products: u64,
    /// Distinct categories in use.
    pub categories_count: u64,
    /// Σ quantity × cost price.
    pub stock_value: Decimal,
}

/// Orders per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    /// Order status.
    pub status: OrderStatus,
    /// Orders in that status.
    pub count: u64,
}

/// Products per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Category name, `Uncategorized` for products without one.
    pub category: String,
    /// Products in that category.
    pub product_count: u64,
}

/// The statistics page in one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsOverview {
    /// Window length in days.
    pub period_days: u32,
    /// First date of the window.
    pub start_date: NaiveDate,
    /// Sales overview.
    pub sales: SalesStats,
    /// Catalog overview.
    pub products: ProductStats,
    /// Settlement overview.
    pub payments: PaymentStats,
    /// Top ten products in the window.
    pub top_products: Vec<TopProduct>,
    /// Current-year monthly series.
    pub monthly_sales: MonthlySalesSeries,
    /// Low-stock overview.
    pub low_stock: LowStockStats,
    /// Orders per status.
    pub order_status_distribution: Vec<StatusCount>,
    /// Products per category.
    pub category_distribution: Vec<CategoryCount>,
}
