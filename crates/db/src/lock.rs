//! Scoped write transactions with exclusive row locks.
//!
//! Every ledger write runs inside a [`WriteScope`]: a transaction that is
//! committed only by an explicit [`WriteScope::commit`]. Dropping the scope
//! on an early return rolls everything back.
//!
//! ```ignore
//! let scope = db.write_scope().await?;
//! let invoice = scope.lock_invoice(invoice_id).await?;
//! // read, check, write through scope.transaction()
//! scope.commit().await?;
//! ```
//!
//! On `PostgreSQL` the lock is `SELECT ... FOR UPDATE`. SQLite has no row
//! locks; its single-writer transactions serialize the same sequence.

use sea_orm::{
    DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{invoices, orders};

/// A write transaction that rolls back unless committed.
pub struct WriteScope {
    txn: DatabaseTransaction,
}

impl WriteScope {
    /// Begins a new write transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started.
    pub async fn begin(db: &DatabaseConnection) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        Ok(Self { txn })
    }

    /// Returns the transaction; every read and write of the scope goes through it.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Loads an order and holds an exclusive lock on its row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn lock_order(&self, order_id: Uuid) -> Result<Option<orders::Model>, DbErr> {
        orders::Entity::find_by_id(order_id)
            .lock_exclusive()
            .one(&self.txn)
            .await
    }

    /// Loads an invoice and holds an exclusive lock on its row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn lock_invoice(&self, invoice_id: Uuid) -> Result<Option<invoices::Model>, DbErr> {
        invoices::Entity::find_by_id(invoice_id)
            .lock_exclusive()
            .one(&self.txn)
            .await
    }

    /// Commits the transaction, persisting all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Extension trait for `DatabaseConnection` to open write scopes.
#[async_trait::async_trait]
pub trait WriteScopeExt {
    /// Begins a write scope on this connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started.
    async fn write_scope(&self) -> Result<WriteScope, DbErr>;
}

#[async_trait::async_trait]
impl WriteScopeExt for DatabaseConnection {
    async fn write_scope(&self) -> Result<WriteScope, DbErr> {
        WriteScope::begin(self).await
    }
}
