//! Stats repository: loads ledger snapshots for the aggregation engine.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, EntityTrait,
    IsolationLevel, QueryOrder, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use inventra_core::ledger::OrderLine;
use inventra_core::stats::{
    DashboardStats, InvoiceSnapshot, LedgerSnapshot, LowStockStats, MonthlySalesSeries,
    OrderSnapshot, PaymentSnapshot, PaymentStats, StatisticsOverview, StatsService, TopProduct,
};
use inventra_shared::types::{InvoiceId, OrderId};

use crate::entities::{invoices, order_items, orders, payments, products};

use super::catalog::product_info;
use super::order::order_lines;

/// Longest window accepted for period figures, in days.
pub const MAX_PERIOD_DAYS: u32 = 3650;
/// Largest top-sellers list.
pub const MAX_TOP_LIMIT: usize = 100;

/// Error types for statistics queries.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// A query parameter is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Stats repository.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    db: DatabaseConnection,
    tz: Tz,
}

impl StatsRepository {
    /// Creates a new stats repository bucketing dates in UTC.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db, tz: Tz::UTC }
    }

    /// Sets the business timezone used to assign orders to calendar days.
    #[must_use]
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    /// Today's business date.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    /// Loads the catalog and all three ledgers.
    ///
    /// All five tables are read inside one read-only transaction so the
    /// snapshot never shows an order without its items. On PostgreSQL the
    /// transaction is `REPEATABLE READ`; SQLite transactions are already
    /// serializable.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn load_snapshot(&self) -> Result<LedgerSnapshot, StatsError> {
        let txn = match self.db.get_database_backend() {
            DatabaseBackend::Sqlite => self.db.begin().await?,
            DatabaseBackend::Postgres | DatabaseBackend::MySql => {
                self.db
                    .begin_with_config(
                        Some(IsolationLevel::RepeatableRead),
                        Some(AccessMode::ReadOnly),
                    )
                    .await?
            }
        };

        let product_rows = products::Entity::find().all(&txn).await?;
        let order_rows = orders::Entity::find().all(&txn).await?;
        let item_rows = order_items::Entity::find()
            .order_by_asc(order_items::Column::Position)
            .all(&txn)
            .await?;
        let invoice_rows = invoices::Entity::find().all(&txn).await?;
        let payment_rows = payments::Entity::find().all(&txn).await?;
        txn.commit().await?;

        let mut items_by_order: HashMap<Uuid, Vec<order_items::Model>> = HashMap::new();
        for item in item_rows {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        let orders = order_rows
            .into_iter()
            .map(|order| {
                let items: Vec<OrderLine> = items_by_order
                    .get(&order.id)
                    .map(|items| order_lines(items))
                    .unwrap_or_default();
                OrderSnapshot {
                    id: OrderId::from_uuid(order.id),
                    status: order.status.into(),
                    ordered_on: order.ordered_at.with_timezone(&self.tz).date_naive(),
                    items,
                }
            })
            .collect();

        let snapshot = LedgerSnapshot {
            products: product_rows.iter().map(product_info).collect(),
            orders,
            invoices: invoice_rows
                .into_iter()
                .map(|invoice| InvoiceSnapshot {
                    id: InvoiceId::from_uuid(invoice.id),
                    status: invoice.status.into(),
                    total_amount: invoice.total_amount,
                })
                .collect(),
            payments: payment_rows
                .into_iter()
                .map(|payment| PaymentSnapshot {
                    invoice_id: InvoiceId::from_uuid(payment.invoice_id),
                    amount: payment.amount,
                    payment_date: payment.payment_date,
                })
                .collect(),
        };

        debug!(
            products = snapshot.products.len(),
            orders = snapshot.orders.len(),
            invoices = snapshot.invoices.len(),
            payments = snapshot.payments.len(),
            "Loaded ledger snapshot"
        );

        Ok(snapshot)
    }

    /// Home dashboard figures.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn dashboard(&self, today: NaiveDate) -> Result<DashboardStats, StatsError> {
        let snapshot = self.load_snapshot().await?;
        Ok(StatsService::dashboard_stats(&snapshot, today))
    }

    /// Twelve-month sales series of `year`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for years outside 1..=9999.
    pub async fn monthly_sales(&self, year: i32) -> Result<MonthlySalesSeries, StatsError> {
        if !(1..=9999).contains(&year) {
            return Err(StatsError::InvalidArgument(format!(
                "year must be between 1 and 9999, got {year}"
            )));
        }
        let snapshot = self.load_snapshot().await?;
        Ok(StatsService::monthly_sales_series(&snapshot.orders, year))
    }

    /// Best sellers over the last `period_days` days.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a zero or oversized limit or period.
    pub async fn top_products(
        &self,
        limit: usize,
        period_days: u32,
        today: NaiveDate,
    ) -> Result<Vec<TopProduct>, StatsError> {
        if limit == 0 || limit > MAX_TOP_LIMIT {
            return Err(StatsError::InvalidArgument(format!(
                "limit must be between 1 and {MAX_TOP_LIMIT}, got {limit}"
            )));
        }
        check_period(period_days)?;
        let snapshot = self.load_snapshot().await?;
        Ok(StatsService::top_selling_products(
            &snapshot.orders,
            &snapshot.products,
            limit,
            period_days,
            today,
        ))
    }

    /// Low-stock overview.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn low_stock(&self) -> Result<LowStockStats, StatsError> {
        let rows = products::Entity::find().all(&self.db).await?;
        let products: Vec<_> = rows.iter().map(product_info).collect();
        Ok(StatsService::low_stock_stats(&products))
    }

    /// Invoice settlement overview.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn payment_stats(&self, today: NaiveDate) -> Result<PaymentStats, StatsError> {
        let snapshot = self.load_snapshot().await?;
        Ok(StatsService::payment_stats(
            &snapshot.invoices,
            &snapshot.payments,
            today,
        ))
    }

    /// The full statistics page.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a zero or oversized period.
    pub async fn overview(
        &self,
        period_days: u32,
        today: NaiveDate,
    ) -> Result<StatisticsOverview, StatsError> {
        check_period(period_days)?;
        let snapshot = self.load_snapshot().await?;
        Ok(StatsService::statistics_overview(&snapshot, period_days, today))
    }
}

fn check_period(period_days: u32) -> Result<(), StatsError> {
    if period_days == 0 || period_days > MAX_PERIOD_DAYS {
        return Err(StatsError::InvalidArgument(format!(
            "period must be between 1 and {MAX_PERIOD_DAYS} days, got {period_days}"
        )));
    }
    Ok(())
}
