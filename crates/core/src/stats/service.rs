//! Aggregation folds over ledger snapshots.
//!
//! Every function is deterministic: `today` is passed in, never read from a
//! clock. Sales figures only count items of completed orders.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;

use inventra_shared::types::{ProductId, percent_of, round_money};

use super::types::{
    CategoryCount, DashboardStats, InvoiceSnapshot, LedgerSnapshot, LowStockProduct,
    LowStockStats, MonthlySalesSeries, OrderSnapshot, PaymentSnapshot, PaymentStats,
    ProductStats, SalesStats, StatisticsOverview, StatusCount, TopProduct,
};
use crate::catalog::ProductInfo;
use crate::ledger::{InvoiceStatus, OrderStatus};

/// English month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Default number of products in the top-sellers list.
pub const DEFAULT_TOP_LIMIT: usize = 5;
/// Number of products in the statistics page's top-sellers list.
pub const OVERVIEW_TOP_LIMIT: usize = 10;
/// Default window for period figures, in days.
pub const DEFAULT_PERIOD_DAYS: u32 = 30;
/// Number of products listed in the low-stock overview.
pub const LOW_STOCK_LIST_LIMIT: usize = 10;

/// Label for products without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Stateless aggregation service.
pub struct StatsService;

impl StatsService {
    /// First date of a window of `period_days` ending `today`.
    #[must_use]
    pub fn window_start(today: NaiveDate, period_days: u32) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(period_days)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Home dashboard figures.
    #[must_use]
    pub fn dashboard_stats(snapshot: &LedgerSnapshot, today: NaiveDate) -> DashboardStats {
        let mut stats = DashboardStats {
            total_products: snapshot.products.len() as u64,
            low_stock_count: snapshot
                .products
                .iter()
                .filter(|p| p.is_active && p.is_low_stock())
                .count() as u64,
            stock_value: Self::stock_value(&snapshot.products),
            today_orders: 0,
            orders_this_month: 0,
            today_sales: Decimal::ZERO,
            monthly_sales: Decimal::ZERO,
        };

        for order in &snapshot.orders {
            let is_today = order.ordered_on == today;
            let is_this_month = same_month(order.ordered_on, today);
            let sales = if order.is_completed() {
                order.total()
            } else {
                Decimal::ZERO
            };

            if is_today {
                stats.today_orders += 1;
                stats.today_sales += sales;
            }
            if is_this_month {
                stats.orders_this_month += 1;
                stats.monthly_sales += sales;
            }
        }

        stats
    }

    /// Completed sales per month of `year`; empty months report zero.
    #[must_use]
    pub fn monthly_sales_series(orders: &[OrderSnapshot], year: i32) -> MonthlySalesSeries {
        let mut data = [Decimal::ZERO; 12];
        for order in orders
            .iter()
            .filter(|o| o.is_completed() && o.ordered_on.year() == year)
        {
            data[order.ordered_on.month0() as usize] += order.total();
        }

        MonthlySalesSeries {
            year,
            labels: MONTH_NAMES.iter().map(ToString::to_string).collect(),
            data: data.to_vec(),
        }
    }

    /// Best sellers among completed orders dated in `[today - period_days, today]`.
    ///
    /// Ordered by units sold descending, ties by product id ascending.
    /// Products no longer in the catalog are skipped.
    #[must_use]
    pub fn top_selling_products(
        orders: &[OrderSnapshot],
        products: &[ProductInfo],
        limit: usize,
        period_days: u32,
        today: NaiveDate,
    ) -> Vec<TopProduct> {
        let start = Self::window_start(today, period_days);
        let mut totals: HashMap<ProductId, (i64, Decimal)> = HashMap::new();

        for order in orders
            .iter()
            .filter(|o| o.is_completed() && o.ordered_on >= start && o.ordered_on <= today)
        {
            for line in &order.items {
                let entry = totals.entry(line.product_id).or_insert((0, Decimal::ZERO));
                entry.0 += i64::from(line.quantity);
                entry.1 += line.line_total();
            }
        }

        let catalog: HashMap<ProductId, &ProductInfo> =
            products.iter().map(|p| (p.id, p)).collect();

        let mut ranked: Vec<TopProduct> = totals
            .into_iter()
            .filter_map(|(product_id, (total_quantity, total_sales))| {
                catalog.get(&product_id).map(|p| TopProduct {
                    product_id,
                    name: p.name.clone(),
                    sku: p.sku.clone(),
                    total_quantity,
                    total_sales,
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.total_quantity
                .cmp(&a.total_quantity)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Low-stock overview over active products.
    #[must_use]
    pub fn low_stock_stats(products: &[ProductInfo]) -> LowStockStats {
        let mut low: Vec<&ProductInfo> = products
            .iter()
            .filter(|p| p.is_active && p.is_low_stock())
            .collect();
        low.sort_by(|a, b| {
            a.quantity
                .cmp(&b.quantity)
                .then_with(|| a.sku.cmp(&b.sku))
                .then_with(|| a.id.cmp(&b.id))
        });

        let critical_stock = low.iter().filter(|p| p.is_out_of_stock()).count() as u64;
        let total_low_stock = low.len() as u64;

        LowStockStats {
            products: low
                .into_iter()
                .take(LOW_STOCK_LIST_LIMIT)
                .map(|p| LowStockProduct {
                    product_id: p.id,
                    name: p.name.clone(),
                    sku: p.sku.clone(),
                    quantity: p.quantity,
                    reorder_level: p.reorder_level,
                })
                .collect(),
            total_low_stock,
            critical_stock,
            warning_stock: total_low_stock - critical_stock,
        }
    }

    /// Invoice settlement overview.
    #[must_use]
    pub fn payment_stats(
        invoices: &[InvoiceSnapshot],
        payments: &[PaymentSnapshot],
        today: NaiveDate,
    ) -> PaymentStats {
        let count_status =
            |status: InvoiceStatus| invoices.iter().filter(|i| i.status == status).count() as u64;

        let total_invoices = invoices.len() as u64;
        let partially_paid_invoices = count_status(InvoiceStatus::PartiallyPaid);
        let paid_invoices = count_status(InvoiceStatus::Paid);

        let month_payments = payments
            .iter()
            .filter(|p| same_month(p.payment_date, today) && p.payment_date <= today)
            .map(|p| p.amount)
            .sum();

        PaymentStats {
            total_invoices,
            pending_invoices: count_status(InvoiceStatus::Pending) + partially_paid_invoices,
            partially_paid_invoices,
            paid_invoices,
            payment_rate: percent_of(Decimal::from(paid_invoices), Decimal::from(total_invoices)),
            month_payments,
        }
    }

    /// Order and revenue overview for the window ending `today`.
    #[must_use]
    pub fn sales_stats(orders: &[OrderSnapshot], period_days: u32, today: NaiveDate) -> SalesStats {
        let start = Self::window_start(today, period_days);

        let total_orders = orders.len() as u64;
        let period_orders = orders.iter().filter(|o| o.ordered_on >= start).count() as u64;

        let completed: Vec<&OrderSnapshot> = orders.iter().filter(|o| o.is_completed()).collect();
        let completed_orders = completed.len() as u64;
        let total_sales: Decimal = completed.iter().map(|o| o.total()).sum();
        let period_sales: Decimal = completed
            .iter()
            .filter(|o| o.ordered_on >= start)
            .map(|o| o.total())
            .sum();

        let avg_order_value = if completed_orders == 0 {
            Decimal::ZERO
        } else {
            round_money(total_sales / Decimal::from(completed_orders))
        };

        SalesStats {
            total_orders,
            period_orders,
            completed_orders,
            completion_rate: percent_of(
                Decimal::from(completed_orders),
                Decimal::from(total_orders),
            ),
            total_sales,
            period_sales,
            avg_order_value,
        }
    }

    /// Catalog overview.
    #[must_use]
    pub fn product_stats(products: &[ProductInfo]) -> ProductStats {
        let mut categories: Vec<&str> = products
            .iter()
            .filter_map(|p| p.category.as_deref())
            .collect();
        categories.sort_unstable();
        categories.dedup();

        ProductStats {
            total_products: products.len() as u64,
            active_products: products.iter().filter(|p| p.is_active).count() as u64,
            categories_count: categories.len() as u64,
            stock_value: Self::stock_value(products),
        }
    }

    /// Orders per status, for statuses present, ordered by status name.
    #[must_use]
    pub fn order_status_distribution(orders: &[OrderSnapshot]) -> Vec<StatusCount> {
        let mut counts: BTreeMap<&'static str, (OrderStatus, u64)> = BTreeMap::new();
        for order in orders {
            counts
                .entry(order.status.as_str())
                .or_insert((order.status, 0))
                .1 += 1;
        }
        counts
            .into_values()
            .map(|(status, count)| StatusCount { status, count })
            .collect()
    }

    /// Products per category, largest first, ties by name.
    #[must_use]
    pub fn category_distribution(products: &[ProductInfo]) -> Vec<CategoryCount> {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for product in products {
            let name = product.category.as_deref().unwrap_or(UNCATEGORIZED);
            *counts.entry(name).or_insert(0) += 1;
        }

        let mut distribution: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(category, product_count)| CategoryCount {
                category: category.to_string(),
                product_count,
            })
            .collect();
        distribution.sort_by(|a, b| {
            b.product_count
                .cmp(&a.product_count)
                .then_with(|| a.category.cmp(&b.category))
        });
        distribution
    }

    /// Everything the statistics page shows.
    #[must_use]
    pub fn statistics_overview(
        snapshot: &LedgerSnapshot,
        period_days: u32,
        today: NaiveDate,
    ) -> StatisticsOverview {
        StatisticsOverview {
            period_days,
            start_date: Self::window_start(today, period_days),
            sales: Self::sales_stats(&snapshot.orders, period_days, today),
            products: Self::product_stats(&snapshot.products),
            payments: Self::payment_stats(&snapshot.invoices, &snapshot.payments, today),
            top_products: Self::top_selling_products(
                &snapshot.orders,
                &snapshot.products,
                OVERVIEW_TOP_LIMIT,
                period_days,
                today,
            ),
            monthly_sales: Self::monthly_sales_series(&snapshot.orders, today.year()),
            low_stock: Self::low_stock_stats(&snapshot.products),
            order_status_distribution: Self::order_status_distribution(&snapshot.orders),
            category_distribution: Self::category_distribution(&snapshot.products),
        }
    }

    fn stock_value(products: &[ProductInfo]) -> Decimal {
        products.iter().map(ProductInfo::stock_value).sum()
    }
}

fn same_month(date: NaiveDate, today: NaiveDate) -> bool {
    date.year() == today.year() && date.month() == today.month()
}
