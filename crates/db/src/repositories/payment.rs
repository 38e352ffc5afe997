//! Payment repository: recording payments against invoices.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use inventra_core::ledger::{InvoiceBalance, InvoiceStatus, LedgerError, PaymentMethod, PaymentService};
use inventra_shared::types::InvoiceId;

use crate::entities::{invoices, payments};
use crate::lock::WriteScopeExt;

use super::db_error;
use super::invoice::payment_amounts;

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct AddPaymentInput {
    /// Invoice being paid.
    pub invoice_id: Uuid,
    /// Amount paid, strictly positive.
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// External reference (transfer id, check number).
    pub reference: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Date the money was received.
    pub payment_date: NaiveDate,
    /// Acting user.
    pub created_by: Uuid,
}

/// A recorded payment with the invoice balance that follows it.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    /// The payment row.
    pub payment: payments::Model,
    /// Invoice balance after the payment.
    pub balance: InvoiceBalance,
    /// Invoice status after the payment.
    pub invoice_status: InvoiceStatus,
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a payment.
    ///
    /// The invoice row is locked and the remaining balance recomputed inside
    /// the transaction, so concurrent payments cannot overshoot the total.
    ///
    /// # Errors
    ///
    /// `NonPositiveAmount`, `InvoiceNotFound`, or `Overpayment` when the
    /// amount exceeds the remaining balance. State is unchanged on error.
    pub async fn add_payment(&self, input: AddPaymentInput) -> Result<PaymentReceipt, LedgerError> {
        if input.amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(input.amount));
        }
        let invoice_id = InvoiceId::from_uuid(input.invoice_id);

        let scope = self.db.write_scope().await.map_err(db_error)?;
        let invoice = scope
            .lock_invoice(input.invoice_id)
            .await
            .map_err(db_error)?
            .ok_or(LedgerError::InvoiceNotFound(invoice_id))?;
        let txn = scope.transaction();

        let paid = payment_amounts(txn, invoice.id).await.map_err(db_error)?;
        let balance = InvoiceBalance::compute(invoice.total_amount, paid);
        let outcome = PaymentService::validate(invoice_id, input.amount, &balance)?;

        let now = Utc::now();
        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(input.invoice_id),
            amount: Set(input.amount),
            method: Set(input.method.into()),
            reference: Set(input.reference),
            notes: Set(input.notes),
            payment_date: Set(input.payment_date),
            created_by: Set(input.created_by),
            created_at: Set(now.into()),
        }
        .insert(txn)
        .await
        .map_err(db_error)?;

        let mut active: invoices::ActiveModel = invoice.into();
        active.status = Set(outcome.new_status.into());
        active.updated_at = Set(now.into());
        active.update(txn).await.map_err(db_error)?;

        scope.commit().await.map_err(db_error)?;

        info!(
            payment_id = %payment.id,
            invoice_id = %invoice_id,
            amount = %payment.amount,
            remaining = %outcome.balance_after.remaining,
            status = %outcome.new_status,
            actor = %input.created_by,
            "Payment recorded"
        );

        Ok(PaymentReceipt {
            payment,
            balance: outcome.balance_after,
            invoice_status: outcome.new_status,
        })
    }

    /// Lists the payments of an invoice, latest payment date first.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceNotFound` if the invoice does not exist.
    pub async fn list_payments(&self, invoice_id: Uuid) -> Result<Vec<payments::Model>, LedgerError> {
        invoices::Entity::find_by_id(invoice_id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(LedgerError::InvoiceNotFound(InvoiceId::from_uuid(invoice_id)))?;

        payments::Entity::find()
            .filter(payments::Column::InvoiceId.eq(invoice_id))
            .order_by_desc(payments::Column::PaymentDate)
            .order_by_desc(payments::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_error)
    }
}
