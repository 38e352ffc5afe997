//! Invoice repository: invoicing orders and reading balances.

use chrono::Utc;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use inventra_core::ledger::{
    DocumentKind, InvoiceBalance, InvoiceService, InvoiceStatus, InvoiceTerms, LedgerError,
    OrderService, document_number,
};
use inventra_shared::BusinessSettings;
use inventra_shared::types::{InvoiceId, OrderId, PageRequest, PageResponse};

use crate::entities::{invoices, orders, payments};
use crate::lock::WriteScopeExt;

use super::order::{find_items, order_lines};
use super::{db_error, unique_violation};

/// Input for invoicing an order.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    /// Order to invoice.
    pub order_id: Uuid,
    /// Tax percentage; the configured default when omitted.
    pub tax_rate: Option<Decimal>,
    /// Absolute discount; zero when omitted.
    pub discount: Option<Decimal>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Acting user.
    pub created_by: Uuid,
}

/// Invoice with its current balance.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceWithBalance {
    /// Invoice row.
    pub invoice: invoices::Model,
    /// Sum of recorded payments.
    pub total_paid: Decimal,
    /// Amount still due.
    pub remaining: Decimal,
    /// True when nothing remains to be paid.
    pub is_settled: bool,
}

impl InvoiceWithBalance {
    fn new(invoice: invoices::Model, balance: InvoiceBalance) -> Self {
        Self {
            invoice,
            total_paid: balance.total_paid,
            remaining: balance.remaining,
            is_settled: balance.is_settled,
        }
    }
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
    default_tax_rate: Decimal,
    tz: Tz,
}

impl InvoiceRepository {
    /// Creates a new invoice repository using the default business settings.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            default_tax_rate: BusinessSettings::default().default_tax_rate,
            tz: Tz::UTC,
        }
    }

    /// Sets the tax rate applied when a request omits one.
    #[must_use]
    pub fn with_default_tax_rate(mut self, tax_rate: Decimal) -> Self {
        self.default_tax_rate = tax_rate;
        self
    }

    /// Sets the business timezone used for invoice numbers.
    #[must_use]
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    /// Issues the invoice of an order.
    ///
    /// The order row stays locked from the existence check to the insert.
    /// A zero total is settled at creation.
    ///
    /// # Errors
    ///
    /// `OrderNotFound`, `InvoiceAlreadyExists`, `OrderNotInvoiceable` for
    /// cancelled or rejected orders, or a tax/discount validation error.
    pub async fn create_invoice(
        &self,
        input: CreateInvoiceInput,
    ) -> Result<invoices::Model, LedgerError> {
        let order_id = OrderId::from_uuid(input.order_id);

        let scope = self.db.write_scope().await.map_err(db_error)?;
        let order = scope
            .lock_order(input.order_id)
            .await
            .map_err(db_error)?
            .ok_or(LedgerError::OrderNotFound(order_id))?;
        let txn = scope.transaction();

        let existing = find_by_order(txn, input.order_id).await.map_err(db_error)?;
        InvoiceService::ensure_invoiceable(
            order_id,
            order.status.into(),
            existing.as_ref().map(|i| i.invoice_number.as_str()),
        )?;

        let items = find_items(txn, order.id).await.map_err(db_error)?;
        let subtotal = OrderService::subtotal(&order_lines(&items));
        let totals = InvoiceService::compute_totals(
            subtotal,
            InvoiceTerms {
                tax_rate: input.tax_rate.unwrap_or(self.default_tax_rate),
                discount: input.discount.unwrap_or(Decimal::ZERO),
            },
        )?;

        let now = Utc::now();
        let invoice_number = document_number(
            DocumentKind::Invoice,
            now.with_timezone(&self.tz).date_naive(),
            Uuid::new_v4(),
        );
        let status = InvoiceStatus::derive(totals.total_amount, Decimal::ZERO);

        let invoice = invoices::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_number: Set(invoice_number.clone()),
            order_id: Set(input.order_id),
            subtotal: Set(totals.subtotal),
            tax_rate: Set(totals.tax_rate),
            discount: Set(totals.discount),
            total_amount: Set(totals.total_amount),
            status: Set(status.into()),
            notes: Set(input.notes),
            created_by: Set(input.created_by),
            issued_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(txn)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(message) if message.contains("order_id") => {
                warn!(order_id = %order_id, "Concurrent invoice creation rejected");
                LedgerError::InvoiceAlreadyExists {
                    order_id,
                    invoice_number: String::new(),
                }
            }
            Some(_) => LedgerError::DuplicateDocumentNumber(invoice_number.clone()),
            None => db_error(e),
        })?;

        scope.commit().await.map_err(db_error)?;

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            order_id = %order_id,
            total = %invoice.total_amount,
            actor = %input.created_by,
            "Invoice created"
        );

        Ok(invoice)
    }

    /// Gets an invoice with its balance.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceNotFound` if the invoice does not exist.
    pub async fn get_invoice_with_balance(
        &self,
        invoice_id: Uuid,
    ) -> Result<InvoiceWithBalance, LedgerError> {
        let invoice = invoices::Entity::find_by_id(invoice_id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(LedgerError::InvoiceNotFound(InvoiceId::from_uuid(invoice_id)))?;
        self.with_balance(invoice).await
    }

    /// Gets the invoice of an order with its balance.
    ///
    /// # Errors
    ///
    /// `OrderNotFound` if the order does not exist, `OrderNotInvoiced` if it
    /// has no invoice yet.
    pub async fn get_invoice_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<InvoiceWithBalance, LedgerError> {
        let typed_id = OrderId::from_uuid(order_id);
        orders::Entity::find_by_id(order_id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(LedgerError::OrderNotFound(typed_id))?;

        let invoice = find_by_order(&self.db, order_id)
            .await
            .map_err(db_error)?
            .ok_or(LedgerError::OrderNotInvoiced(typed_id))?;
        self.with_balance(invoice).await
    }

    /// Lists invoices, most recently issued first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_invoices(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<invoices::Model>, LedgerError> {
        let page = page.normalized();

        let total = invoices::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_error)?;
        let rows = invoices::Entity::find()
            .order_by_desc(invoices::Column::IssuedAt)
            .order_by_desc(invoices::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }

    async fn with_balance(&self, invoice: invoices::Model) -> Result<InvoiceWithBalance, LedgerError> {
        let paid = payment_amounts(&self.db, invoice.id).await.map_err(db_error)?;
        let balance = InvoiceBalance::compute(invoice.total_amount, paid);
        Ok(InvoiceWithBalance::new(invoice, balance))
    }
}

async fn find_by_order<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<Option<invoices::Model>, DbErr> {
    invoices::Entity::find()
        .filter(invoices::Column::OrderId.eq(order_id))
        .one(conn)
        .await
}

/// Amounts of every payment recorded against an invoice.
pub(crate) async fn payment_amounts<C: ConnectionTrait>(
    conn: &C,
    invoice_id: Uuid,
) -> Result<Vec<Decimal>, DbErr> {
    let rows = payments::Entity::find()
        .filter(payments::Column::InvoiceId.eq(invoice_id))
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(|p| p.amount).collect())
}
