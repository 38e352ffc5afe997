//! Order ledger: order status, line items and totals.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inventra_shared::types::{ClientId, OrderId, ProductId};

use super::error::{LedgerError, ensure_money};
use crate::catalog::{ClientInfo, ProductInfo};

/// Order status.
///
/// Which status may follow which is decided by the transition table in
/// [`super::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order received, not yet worked on.
    Pending,
    /// Order is being prepared.
    InProgress,
    /// Order delivered; counts toward sales.
    Completed,
    /// Order cancelled by the business or the client.
    Cancelled,
    /// Order refused.
    Rejected,
}

impl OrderStatus {
    /// All statuses in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
        Self::Rejected,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
        }
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Rejected => "Rejected",
        }
    }

    /// Parses a status from a string, ignoring case.
    ///
    /// `in_progress`, `in-progress` and `inprogress` all name the same status.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "in_progress" | "in-progress" | "inprogress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Parses a status, failing with a validation error for unknown values.
    pub fn parse_or_err(s: &str) -> Result<Self, LedgerError> {
        Self::parse(s).ok_or_else(|| LedgerError::InvalidStatus(s.to_string()))
    }

    /// Returns true if the order's items may still change.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    /// Returns true if an invoice may be issued for an order in this status.
    #[must_use]
    pub fn is_invoiceable(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::Rejected)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Requested order item, before catalog resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemInput {
    /// The product ordered.
    pub product_id: ProductId,
    /// Number of units.
    pub quantity: i32,
    /// Unit price; defaults to the catalog selling price when omitted.
    pub unit_price: Option<Decimal>,
}

/// A priced order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// The product ordered.
    pub product_id: ProductId,
    /// Number of units.
    pub quantity: i32,
    /// Unit price captured when the line was created.
    pub unit_price: Decimal,
}

impl OrderLine {
    /// Quantity times unit price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// Stateless service holding the order ledger rules.
pub struct OrderService;

impl OrderService {
    /// Validates an order request and prices its items.
    ///
    /// Checks, in order: at least one item, the client exists and is active,
    /// then each item (positive quantity, non-negative explicit price in
    /// whole cents, product exists and is active). Omitted prices take the
    /// product's current selling price. An unknown client is a validation
    /// failure of the request, not a missing resource.
    ///
    /// # Errors
    ///
    /// Returns the first `LedgerError` encountered.
    pub fn validate_and_resolve<C, P>(
        client_id: ClientId,
        items: &[OrderItemInput],
        client_lookup: C,
        product_lookup: P,
    ) -> Result<Vec<OrderLine>, LedgerError>
    where
        C: Fn(ClientId) -> Result<ClientInfo, LedgerError>,
        P: Fn(ProductId) -> Result<ProductInfo, LedgerError>,
    {
        if items.is_empty() {
            return Err(LedgerError::EmptyOrder);
        }

        let client = client_lookup(client_id).map_err(|e| match e {
            LedgerError::ClientNotFound(id) => LedgerError::UnknownClient(id),
            other => other,
        })?;
        if !client.is_active {
            return Err(LedgerError::ClientInactive(client_id));
        }

        Self::resolve_items(items, product_lookup)
    }

    /// Prices a replacement item list for an existing order.
    ///
    /// # Errors
    ///
    /// Returns `EmptyOrder` for an empty list, the first item error, or
    /// `AmountOutOfRange` when the subtotal cannot be stored.
    pub fn resolve_items<P>(
        items: &[OrderItemInput],
        product_lookup: P,
    ) -> Result<Vec<OrderLine>, LedgerError>
    where
        P: Fn(ProductId) -> Result<ProductInfo, LedgerError>,
    {
        if items.is_empty() {
            return Err(LedgerError::EmptyOrder);
        }

        let lines = items
            .iter()
            .map(|item| Self::resolve_item(item, &product_lookup))
            .collect::<Result<Vec<_>, _>>()?;
        ensure_money("subtotal", Self::subtotal(&lines))?;
        Ok(lines)
    }

    fn resolve_item<P>(item: &OrderItemInput, product_lookup: &P) -> Result<OrderLine, LedgerError>
    where
        P: Fn(ProductId) -> Result<ProductInfo, LedgerError>,
    {
        if item.quantity <= 0 {
            return Err(LedgerError::InvalidQuantity {
                product_id: item.product_id,
                quantity: item.quantity,
            });
        }
        if let Some(price) = item.unit_price
            && price < Decimal::ZERO
        {
            return Err(LedgerError::NegativePrice {
                product_id: item.product_id,
                price,
            });
        }
        if let Some(price) = item.unit_price {
            ensure_money("unit_price", price)?;
        }

        let product = product_lookup(item.product_id)?;
        if !product.is_active {
            return Err(LedgerError::ProductInactive(item.product_id));
        }

        Ok(OrderLine {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price.unwrap_or(product.selling_price),
        })
    }

    /// Sum of the line totals.
    #[must_use]
    pub fn subtotal(lines: &[OrderLine]) -> Decimal {
        lines.iter().map(OrderLine::line_total).sum()
    }

    /// Checks that an order's items may be replaced.
    ///
    /// # Errors
    ///
    /// Returns `OrderAlreadyInvoiced` if an invoice exists, or
    /// `OrderNotEditable` if the status no longer allows item changes.
    pub fn ensure_items_editable(
        order_id: OrderId,
        status: OrderStatus,
        has_invoice: bool,
    ) -> Result<(), LedgerError> {
        if has_invoice {
            return Err(LedgerError::OrderAlreadyInvoiced(order_id));
        }
        if !status.is_editable() {
            return Err(LedgerError::OrderNotEditable { order_id, status });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn product(name: &str, price: Decimal, is_active: bool) -> ProductInfo {
        ProductInfo {
            id: ProductId::new(),
            name: name.to_string(),
            sku: name.to_uppercase(),
            category: None,
            cost_price: dec!(1.00),
            selling_price: price,
            quantity: 10,
            reorder_level: 2,
            is_active,
        }
    }

    fn client(is_active: bool) -> ClientInfo {
        ClientInfo {
            id: ClientId::new(),
            name: "Acme".to_string(),
            is_active,
        }
    }

    fn lookup(
        products: &[ProductInfo],
    ) -> impl Fn(ProductId) -> Result<ProductInfo, LedgerError> + use<> {
        let map: HashMap<ProductId, ProductInfo> =
            products.iter().map(|p| (p.id, p.clone())).collect();
        move |id| map.get(&id).cloned().ok_or(LedgerError::ProductNotFound(id))
    }

    #[test]
    fn test_resolve_defaults_to_catalog_price() {
        let a = product("a", dec!(10.00), true);
        let b = product("b", dec!(5.00), true);
        let c = client(true);
        let items = vec![
            OrderItemInput {
                product_id: a.id,
                quantity: 2,
                unit_price: None,
            },
            OrderItemInput {
                product_id: b.id,
                quantity: 1,
                unit_price: Some(dec!(4.50)),
            },
        ];

        let lines = OrderService::validate_and_resolve(
            c.id,
            &items,
            |_| Ok(c.clone()),
            lookup(&[a.clone(), b.clone()]),
        )
        .unwrap();

        assert_eq!(lines[0].unit_price, dec!(10.00));
        assert_eq!(lines[1].unit_price, dec!(4.50));
        assert_eq!(OrderService::subtotal(&lines), dec!(24.50));
    }

    #[test]
    fn test_empty_order_rejected_before_lookups() {
        let result = OrderService::validate_and_resolve(
            ClientId::new(),
            &[],
            |id| Err(LedgerError::ClientNotFound(id)),
            |id| Err(LedgerError::ProductNotFound(id)),
        );
        assert!(matches!(result, Err(LedgerError::EmptyOrder)));
    }

    #[test]
    fn test_inactive_client_rejected() {
        let c = client(false);
        let a = product("a", dec!(1.00), true);
        let items = vec![OrderItemInput {
            product_id: a.id,
            quantity: 1,
            unit_price: None,
        }];
        let result =
            OrderService::validate_and_resolve(c.id, &items, |_| Ok(c.clone()), lookup(&[a]));
        assert!(matches!(result, Err(LedgerError::ClientInactive(id)) if id == c.id));
    }

    #[test]
    fn test_unknown_client_rejected() {
        let a = product("a", dec!(1.00), true);
        let items = vec![OrderItemInput {
            product_id: a.id,
            quantity: 1,
            unit_price: None,
        }];
        let result = OrderService::validate_and_resolve(
            ClientId::new(),
            &items,
            |id| Err(LedgerError::ClientNotFound(id)),
            lookup(&[a]),
        );
        let err = result.unwrap_err();
        assert!(matches!(err, LedgerError::UnknownClient(_)));
        assert_eq!(err.http_status_code(), 400);
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn test_non_positive_quantity_rejected(#[case] quantity: i32) {
        let a = product("a", dec!(1.00), true);
        let items = vec![OrderItemInput {
            product_id: a.id,
            quantity,
            unit_price: None,
        }];
        let result = OrderService::resolve_items(&items, lookup(&[a]));
        assert!(matches!(
            result,
            Err(LedgerError::InvalidQuantity { quantity: q, .. }) if q == quantity
        ));
    }

    #[test]
    fn test_negative_price_rejected_zero_allowed() {
        let a = product("a", dec!(1.00), true);
        let negative = vec![OrderItemInput {
            product_id: a.id,
            quantity: 1,
            unit_price: Some(dec!(-0.01)),
        }];
        assert!(matches!(
            OrderService::resolve_items(&negative, lookup(&[a.clone()])),
            Err(LedgerError::NegativePrice { .. })
        ));

        let free = vec![OrderItemInput {
            product_id: a.id,
            quantity: 1,
            unit_price: Some(Decimal::ZERO),
        }];
        let lines = OrderService::resolve_items(&free, lookup(&[a])).unwrap();
        assert_eq!(OrderService::subtotal(&lines), Decimal::ZERO);
    }

    #[rstest]
    #[case(dec!(9.999), "invalid_precision")]
    #[case(dec!(0.001), "invalid_precision")]
    #[case(dec!(100_000_000_000_000), "amount_out_of_range")]
    fn test_unit_price_must_fit_money_column(#[case] price: Decimal, #[case] code: &str) {
        let a = product("a", dec!(1.00), true);
        let items = vec![OrderItemInput {
            product_id: a.id,
            quantity: 1,
            unit_price: Some(price),
        }];
        let err = OrderService::resolve_items(&items, lookup(&[a])).unwrap_err();
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_subtotal_must_fit_money_column() {
        let a = product("a", dec!(1.00), true);
        let items = vec![OrderItemInput {
            product_id: a.id,
            quantity: 1_000_000,
            unit_price: Some(dec!(99_999_999_999.99)),
        }];
        assert!(matches!(
            OrderService::resolve_items(&items, lookup(&[a])),
            Err(LedgerError::AmountOutOfRange { field: "subtotal", .. })
        ));
    }

    #[test]
    fn test_inactive_or_unknown_product_rejected() {
        let retired = product("old", dec!(1.00), false);
        let items = vec![OrderItemInput {
            product_id: retired.id,
            quantity: 1,
            unit_price: None,
        }];
        assert!(matches!(
            OrderService::resolve_items(&items, lookup(&[retired.clone()])),
            Err(LedgerError::ProductInactive(_))
        ));
        assert!(matches!(
            OrderService::resolve_items(&items, lookup(&[])),
            Err(LedgerError::ProductNotFound(_))
        ));
    }

    #[rstest]
    #[case("pending", Some(OrderStatus::Pending))]
    #[case("IN_PROGRESS", Some(OrderStatus::InProgress))]
    #[case("in-progress", Some(OrderStatus::InProgress))]
    #[case("Completed", Some(OrderStatus::Completed))]
    #[case("cancelled", Some(OrderStatus::Cancelled))]
    #[case(" rejected ", Some(OrderStatus::Rejected))]
    #[case("shipped", None)]
    #[case("", None)]
    fn test_status_parse(#[case] input: &str, #[case] expected: Option<OrderStatus>) {
        assert_eq!(OrderStatus::parse(input), expected);
    }

    #[test]
    fn test_status_parse_or_err_keeps_input() {
        match OrderStatus::parse_or_err("archived") {
            Err(LedgerError::InvalidStatus(value)) => assert_eq!(value, "archived"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_status_round_trips_through_as_str() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_items_editable_rules() {
        let id = OrderId::new();
        assert!(OrderService::ensure_items_editable(id, OrderStatus::Pending, false).is_ok());
        assert!(OrderService::ensure_items_editable(id, OrderStatus::InProgress, false).is_ok());
        assert!(matches!(
            OrderService::ensure_items_editable(id, OrderStatus::Pending, true),
            Err(LedgerError::OrderAlreadyInvoiced(_))
        ));
        assert!(matches!(
            OrderService::ensure_items_editable(id, OrderStatus::Completed, false),
            Err(LedgerError::OrderNotEditable { .. })
        ));
    }
}
