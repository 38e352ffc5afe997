//! Order repository: order intake, status changes and item edits.

use std::collections::HashMap;

use chrono::Utc;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use inventra_core::ledger::{
    DocumentKind, LedgerError, OrderItemInput, OrderLine, OrderService, OrderStatus,
    OrderTransitions, TransitionPolicy, document_number,
};
use inventra_core::catalog::ProductInfo;
use inventra_shared::types::{ClientId, OrderId, PageRequest, PageResponse, ProductId};

use crate::entities::{
    invoices, order_items, orders, sea_orm_active_enums::OrderStatus as DbOrderStatus,
};
use crate::lock::WriteScopeExt;

use super::catalog::{load_client, load_products};
use super::{db_error, unique_violation};

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    /// Ordering client.
    pub client_id: Uuid,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Requested items, in display order.
    pub items: Vec<OrderItemInput>,
    /// Acting user.
    pub created_by: Uuid,
}

/// Order with its items and computed subtotal.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    /// Order header.
    pub order: orders::Model,
    /// Items ordered by position.
    pub items: Vec<order_items::Model>,
    /// Σ quantity × unit price.
    pub subtotal: Decimal,
}

impl OrderWithItems {
    fn new(order: orders::Model, items: Vec<order_items::Model>) -> Self {
        let subtotal = OrderService::subtotal(&order_lines(&items));
        Self {
            order,
            items,
            subtotal,
        }
    }
}

/// Order repository.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
    policy: TransitionPolicy,
    tz: Tz,
}

impl OrderRepository {
    /// Creates a new order repository with the strict transition policy and UTC dates.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            policy: TransitionPolicy::Strict,
            tz: Tz::UTC,
        }
    }

    /// Sets the transition policy for status updates.
    #[must_use]
    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the business timezone used for order numbers.
    #[must_use]
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    /// Creates a pending order with its items in one transaction.
    ///
    /// Omitted unit prices take the product's current selling price.
    ///
    /// # Errors
    ///
    /// Validation errors for empty orders, bad quantities or prices, unknown
    /// or inactive clients and inactive products; `ProductNotFound` for
    /// unknown products.
    pub async fn create_order(&self, input: CreateOrderInput) -> Result<OrderWithItems, LedgerError> {
        let scope = self.db.write_scope().await.map_err(db_error)?;
        let txn = scope.transaction();

        let client_id = ClientId::from_uuid(input.client_id);
        let client = load_client(txn, client_id).await.map_err(db_error)?;
        let catalog = load_catalog(txn, &input.items).await?;

        let lines = OrderService::validate_and_resolve(
            client_id,
            &input.items,
            |id| client.clone().ok_or(LedgerError::ClientNotFound(id)),
            |id| lookup_product(&catalog, id),
        )?;

        let now = Utc::now();
        let order_number = document_number(
            DocumentKind::Order,
            now.with_timezone(&self.tz).date_naive(),
            Uuid::new_v4(),
        );

        let order = orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_number: Set(order_number.clone()),
            client_id: Set(input.client_id),
            status: Set(DbOrderStatus::Pending),
            notes: Set(input.notes),
            created_by: Set(input.created_by),
            ordered_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(txn)
        .await
        .map_err(|e| {
            if unique_violation(&e).is_some() {
                LedgerError::DuplicateDocumentNumber(order_number.clone())
            } else {
                db_error(e)
            }
        })?;

        let items = insert_items(txn, order.id, &lines).await?;
        scope.commit().await.map_err(db_error)?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            items = items.len(),
            actor = %input.created_by,
            "Order created"
        );

        Ok(OrderWithItems::new(order, items))
    }

    /// Moves an order to a new status.
    ///
    /// Parsing ignores case and accepts `in_progress`, `in-progress` and
    /// `inprogress`. Requesting the current status is a no-op.
    ///
    /// # Errors
    ///
    /// `InvalidStatus` for unknown values, `OrderNotFound`, or
    /// `IllegalTransition` when the configured table forbids the edge.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: &str,
        actor: Uuid,
    ) -> Result<OrderWithItems, LedgerError> {
        let target = OrderStatus::parse_or_err(new_status)?;

        let scope = self.db.write_scope().await.map_err(db_error)?;
        let order = scope
            .lock_order(order_id)
            .await
            .map_err(db_error)?
            .ok_or(LedgerError::OrderNotFound(OrderId::from_uuid(order_id)))?;

        let change = OrderTransitions::check(self.policy, order.status.into(), target)?;
        let order = if change.is_change() {
            let mut active: orders::ActiveModel = order.into();
            active.status = Set(change.resulting_status().into());
            active.updated_at = Set(Utc::now().into());
            active.update(scope.transaction()).await.map_err(db_error)?
        } else {
            order
        };

        let items = find_items(scope.transaction(), order.id).await.map_err(db_error)?;
        scope.commit().await.map_err(db_error)?;

        if change.is_change() {
            info!(order_id = %order_id, status = %target, actor = %actor, "Order status updated");
        }

        Ok(OrderWithItems::new(order, items))
    }

    /// Replaces every item of an order that has not been invoiced yet.
    ///
    /// # Errors
    ///
    /// `OrderNotFound`, `OrderAlreadyInvoiced` once an invoice exists,
    /// `OrderNotEditable` outside pending/in-progress, or any item error.
    pub async fn replace_items(
        &self,
        order_id: Uuid,
        items: Vec<OrderItemInput>,
        actor: Uuid,
    ) -> Result<OrderWithItems, LedgerError> {
        let scope = self.db.write_scope().await.map_err(db_error)?;
        let order = scope
            .lock_order(order_id)
            .await
            .map_err(db_error)?
            .ok_or(LedgerError::OrderNotFound(OrderId::from_uuid(order_id)))?;
        let txn = scope.transaction();

        let has_invoice = invoices::Entity::find()
            .filter(invoices::Column::OrderId.eq(order_id))
            .one(txn)
            .await
            .map_err(db_error)?
            .is_some();
        OrderService::ensure_items_editable(
            OrderId::from_uuid(order_id),
            order.status.into(),
            has_invoice,
        )?;

        let catalog = load_catalog(txn, &items).await?;
        let lines = OrderService::resolve_items(&items, |id| lookup_product(&catalog, id))?;

        order_items::Entity::delete_many()
            .filter(order_items::Column::OrderId.eq(order_id))
            .exec(txn)
            .await
            .map_err(db_error)?;
        let inserted = insert_items(txn, order_id, &lines).await?;

        let mut active: orders::ActiveModel = order.into();
        active.updated_at = Set(Utc::now().into());
        let order = active.update(txn).await.map_err(db_error)?;

        scope.commit().await.map_err(db_error)?;

        info!(order_id = %order_id, items = inserted.len(), actor = %actor, "Order items replaced");

        Ok(OrderWithItems::new(order, inserted))
    }

    /// Gets an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotFound` if the order does not exist.
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderWithItems, LedgerError> {
        let order = orders::Entity::find_by_id(order_id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(LedgerError::OrderNotFound(OrderId::from_uuid(order_id)))?;
        let items = find_items(&self.db, order_id).await.map_err(db_error)?;
        Ok(OrderWithItems::new(order, items))
    }

    /// Lists orders, newest first, ties by id descending.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_orders(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<OrderWithItems>, LedgerError> {
        let page = page.normalized();

        let total = orders::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_error)?;
        let rows = orders::Entity::find()
            .order_by_desc(orders::Column::OrderedAt)
            .order_by_desc(orders::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_error)?;

        let ids: Vec<Uuid> = rows.iter().map(|o| o.id).collect();
        let mut items_by_order: HashMap<Uuid, Vec<order_items::Model>> = HashMap::new();
        if !ids.is_empty() {
            let items = order_items::Entity::find()
                .filter(order_items::Column::OrderId.is_in(ids))
                .order_by_asc(order_items::Column::Position)
                .all(&self.db)
                .await
                .map_err(db_error)?;
            for item in items {
                items_by_order.entry(item.order_id).or_default().push(item);
            }
        }

        let data = rows
            .into_iter()
            .map(|order| {
                let items = items_by_order.remove(&order.id).unwrap_or_default();
                OrderWithItems::new(order, items)
            })
            .collect();

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }
}

/// Converts item rows into priced lines.
pub(crate) fn order_lines(items: &[order_items::Model]) -> Vec<OrderLine> {
    items
        .iter()
        .map(|item| OrderLine {
            product_id: ProductId::from_uuid(item.product_id),
            quantity: item.quantity,
            unit_price: item.unit_price,
        })
        .collect()
}

/// Loads an order's items ordered by position.
pub(crate) async fn find_items<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<Vec<order_items::Model>, DbErr> {
    order_items::Entity::find()
        .filter(order_items::Column::OrderId.eq(order_id))
        .order_by_asc(order_items::Column::Position)
        .all(conn)
        .await
}

async fn load_catalog<C: ConnectionTrait>(
    conn: &C,
    items: &[OrderItemInput],
) -> Result<HashMap<ProductId, ProductInfo>, LedgerError> {
    let ids: Vec<ProductId> = items.iter().map(|i| i.product_id).collect();
    load_products(conn, &ids).await.map_err(db_error)
}

fn lookup_product(
    catalog: &HashMap<ProductId, ProductInfo>,
    id: ProductId,
) -> Result<ProductInfo, LedgerError> {
    catalog
        .get(&id)
        .cloned()
        .ok_or(LedgerError::ProductNotFound(id))
}

async fn insert_items<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    lines: &[OrderLine],
) -> Result<Vec<order_items::Model>, LedgerError> {
    let mut inserted = Vec::with_capacity(lines.len());
    for (position, line) in (0i32..).zip(lines) {
        let item = order_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(line.product_id.into_inner()),
            position: Set(position),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
        }
        .insert(conn)
        .await
        .map_err(db_error)?;
        inserted.push(item);
    }
    Ok(inserted)
}
