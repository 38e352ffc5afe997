//! Invoice ledger: totals, settlement status and balances.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inventra_shared::types::{OrderId, has_money_scale, round_money};

use super::error::{LedgerError, ensure_money};
use super::order::OrderStatus;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Settlement status of an invoice, derived from its payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Nothing paid yet.
    Pending,
    /// Some but not all of the total paid.
    PartiallyPaid,
    /// Remaining balance is zero.
    Paid,
}

impl InvoiceStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "partially_paid" | "partially-paid" | "partiallypaid" => Some(Self::PartiallyPaid),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }

    /// Derives the status from the invoice total and the amount paid so far.
    #[must_use]
    pub fn derive(total: Decimal, paid: Decimal) -> Self {
        if paid >= total {
            Self::Paid
        } else if paid > Decimal::ZERO {
            Self::PartiallyPaid
        } else {
            Self::Pending
        }
    }

    /// Returns true if the invoice still expects payments.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Paid)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tax and discount requested for a new invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTerms {
    /// Tax rate as a percentage (0-100).
    pub tax_rate: Decimal,
    /// Absolute discount subtracted after tax.
    pub discount: Decimal,
}

/// Computed invoice amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Order subtotal captured at invoicing.
    pub subtotal: Decimal,
    /// Tax rate as a percentage.
    pub tax_rate: Decimal,
    /// Tax added on the subtotal, rounded to cents.
    pub tax_amount: Decimal,
    /// Absolute discount.
    pub discount: Decimal,
    /// Amount due.
    pub total_amount: Decimal,
}

/// Balance view of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceBalance {
    /// Amount due.
    pub total_amount: Decimal,
    /// Sum of recorded payments.
    pub total_paid: Decimal,
    /// `total_amount - total_paid`.
    pub remaining: Decimal,
    /// True when nothing remains to be paid.
    pub is_settled: bool,
}

impl InvoiceBalance {
    /// Computes the balance from a total and the recorded payment amounts.
    #[must_use]
    pub fn compute<I>(total_amount: Decimal, payments: I) -> Self
    where
        I: IntoIterator<Item = Decimal>,
    {
        let total_paid: Decimal = payments.into_iter().sum();
        let remaining = total_amount - total_paid;
        Self {
            total_amount,
            total_paid,
            remaining,
            is_settled: remaining <= Decimal::ZERO,
        }
    }

    /// The settlement status matching this balance.
    #[must_use]
    pub fn status(&self) -> InvoiceStatus {
        InvoiceStatus::derive(self.total_amount, self.total_paid)
    }
}

/// Stateless service holding the invoice ledger rules.
pub struct InvoiceService;

impl InvoiceService {
    /// Checks that an invoice may be issued for an order.
    ///
    /// # Errors
    ///
    /// `InvoiceAlreadyExists` when the order already has one (its number is
    /// passed as `existing_invoice`), `OrderNotInvoiceable` for cancelled or
    /// rejected orders.
    pub fn ensure_invoiceable(
        order_id: OrderId,
        status: OrderStatus,
        existing_invoice: Option<&str>,
    ) -> Result<(), LedgerError> {
        if let Some(invoice_number) = existing_invoice {
            return Err(LedgerError::InvoiceAlreadyExists {
                order_id,
                invoice_number: invoice_number.to_string(),
            });
        }
        if !status.is_invoiceable() {
            return Err(LedgerError::OrderNotInvoiceable { order_id, status });
        }
        Ok(())
    }

    /// Computes `subtotal × (1 + tax_rate/100) − discount`, rounded to cents.
    ///
    /// # Errors
    ///
    /// `InvalidTaxRate` outside 0-100, `NegativeDiscount`, or `NegativeTotal`
    /// when the discount exceeds the taxed subtotal. Tax rates and discounts
    /// with more than two decimals are `InvalidPrecision`; totals too large
    /// to store are `AmountOutOfRange`.
    pub fn compute_totals(subtotal: Decimal, terms: InvoiceTerms) -> Result<InvoiceTotals, LedgerError> {
        if terms.tax_rate < Decimal::ZERO || terms.tax_rate > HUNDRED {
            return Err(LedgerError::InvalidTaxRate(terms.tax_rate));
        }
        if !has_money_scale(terms.tax_rate) {
            return Err(LedgerError::InvalidPrecision {
                field: "tax_rate",
                value: terms.tax_rate,
            });
        }
        if terms.discount < Decimal::ZERO {
            return Err(LedgerError::NegativeDiscount(terms.discount));
        }
        ensure_money("discount", terms.discount)?;

        let taxed = subtotal * (Decimal::ONE + terms.tax_rate / HUNDRED);
        let total_amount = round_money(taxed - terms.discount);
        if total_amount < Decimal::ZERO {
            return Err(LedgerError::NegativeTotal(total_amount));
        }
        ensure_money("total_amount", total_amount)?;

        Ok(InvoiceTotals {
            subtotal,
            tax_rate: terms.tax_rate,
            tax_amount: round_money(taxed - subtotal),
            discount: terms.discount,
            total_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn terms(tax_rate: Decimal, discount: Decimal) -> InvoiceTerms {
        InvoiceTerms { tax_rate, discount }
    }

    #[test]
    fn test_totals_with_tax_and_discount() {
        let totals = InvoiceService::compute_totals(dec!(25.00), terms(dec!(10), dec!(2.00))).unwrap();
        assert_eq!(totals.tax_amount, dec!(2.50));
        assert_eq!(totals.total_amount, dec!(25.50));
    }

    #[test]
    fn test_totals_round_half_to_even() {
        // 0.125 rounds down to 0.12, 0.135 rounds up to 0.14
        let a = InvoiceService::compute_totals(dec!(0.125), terms(dec!(0), dec!(0))).unwrap();
        assert_eq!(a.total_amount, dec!(0.12));
        let b = InvoiceService::compute_totals(dec!(0.135), terms(dec!(0), dec!(0))).unwrap();
        assert_eq!(b.total_amount, dec!(0.14));
    }

    #[rstest]
    #[case(dec!(-0.01))]
    #[case(dec!(100.01))]
    fn test_tax_rate_bounds(#[case] rate: Decimal) {
        assert!(matches!(
            InvoiceService::compute_totals(dec!(10), terms(rate, dec!(0))),
            Err(LedgerError::InvalidTaxRate(r)) if r == rate
        ));
    }

    #[test]
    fn test_tax_rate_edges_accepted() {
        assert!(InvoiceService::compute_totals(dec!(10), terms(dec!(0), dec!(0))).is_ok());
        let full = InvoiceService::compute_totals(dec!(10), terms(dec!(100), dec!(0))).unwrap();
        assert_eq!(full.total_amount, dec!(20.00));
    }

    #[rstest]
    #[case(dec!(12.345), dec!(0), "tax_rate")]
    #[case(dec!(10), dec!(0.001), "discount")]
    fn test_sub_cent_terms_rejected(
        #[case] rate: Decimal,
        #[case] discount: Decimal,
        #[case] expected: &str,
    ) {
        assert!(matches!(
            InvoiceService::compute_totals(dec!(25.00), terms(rate, discount)),
            Err(LedgerError::InvalidPrecision { field, .. }) if field == expected
        ));
    }

    #[test]
    fn test_total_too_large_rejected() {
        assert!(matches!(
            InvoiceService::compute_totals(dec!(60_000_000_000_000), terms(dec!(100), dec!(0))),
            Err(LedgerError::AmountOutOfRange { field: "total_amount", .. })
        ));
    }

    #[test]
    fn test_negative_discount_rejected() {
        assert!(matches!(
            InvoiceService::compute_totals(dec!(10), terms(dec!(0), dec!(-1))),
            Err(LedgerError::NegativeDiscount(_))
        ));
    }

    #[test]
    fn test_discount_beyond_total_rejected() {
        assert!(matches!(
            InvoiceService::compute_totals(dec!(10), terms(dec!(0), dec!(10.01))),
            Err(LedgerError::NegativeTotal(t)) if t == dec!(-0.01)
        ));
        let zero = InvoiceService::compute_totals(dec!(10), terms(dec!(0), dec!(10))).unwrap();
        assert_eq!(zero.total_amount, dec!(0.00));
    }

    #[rstest]
    #[case(dec!(0), InvoiceStatus::Pending)]
    #[case(dec!(20), InvoiceStatus::PartiallyPaid)]
    #[case(dec!(25.50), InvoiceStatus::Paid)]
    fn test_status_derivation(#[case] paid: Decimal, #[case] expected: InvoiceStatus) {
        assert_eq!(InvoiceStatus::derive(dec!(25.50), paid), expected);
    }

    #[test]
    fn test_zero_total_is_paid() {
        assert_eq!(InvoiceStatus::derive(Decimal::ZERO, Decimal::ZERO), InvoiceStatus::Paid);
        assert!(InvoiceBalance::compute(Decimal::ZERO, []).is_settled);
    }

    #[test]
    fn test_balance_compute() {
        let balance = InvoiceBalance::compute(dec!(25.50), [dec!(20.00)]);
        assert_eq!(balance.total_paid, dec!(20.00));
        assert_eq!(balance.remaining, dec!(5.50));
        assert!(!balance.is_settled);
        assert_eq!(balance.status(), InvoiceStatus::PartiallyPaid);

        let empty = InvoiceBalance::compute(dec!(25.50), Vec::new());
        assert_eq!(empty.total_paid, Decimal::ZERO);
        assert_eq!(empty.status(), InvoiceStatus::Pending);
    }

    #[test]
    fn test_invoiceable_checks() {
        let order_id = OrderId::new();
        assert!(InvoiceService::ensure_invoiceable(order_id, OrderStatus::Completed, None).is_ok());
        assert!(matches!(
            InvoiceService::ensure_invoiceable(order_id, OrderStatus::Pending, Some("INV-1")),
            Err(LedgerError::InvoiceAlreadyExists { invoice_number, .. }) if invoice_number == "INV-1"
        ));
        assert!(matches!(
            InvoiceService::ensure_invoiceable(order_id, OrderStatus::Rejected, None),
            Err(LedgerError::OrderNotInvoiceable { .. })
        ));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(InvoiceStatus::parse("Partially_Paid"), Some(InvoiceStatus::PartiallyPaid));
        assert_eq!(InvoiceStatus::parse("paid"), Some(InvoiceStatus::Paid));
        assert_eq!(InvoiceStatus::parse("void"), None);
    }
}
