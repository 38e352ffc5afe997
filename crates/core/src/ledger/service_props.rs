//! Property-based tests for the settlement rules.
//!
//! - Order subtotal equals the sum of its line totals
//! - Invoice total follows the tax/discount formula
//! - Payments never push the paid sum past the invoice total
//! - Strict transitions are a subset of permissive ones

use proptest::prelude::*;
use rust_decimal::Decimal;

use inventra_shared::types::{InvoiceId, ProductId, round_money};

use super::error::LedgerError;
use super::invoice::{InvoiceBalance, InvoiceService, InvoiceStatus, InvoiceTerms};
use super::order::{OrderLine, OrderService, OrderStatus};
use super::payment::PaymentService;
use super::transition::OrderTransitions;
use inventra_shared::TransitionPolicy;

/// Strategy to generate prices (0.00 to 1,000.00).
fn price() -> impl Strategy<Value = Decimal> {
    (0i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate positive payment amounts (0.01 to 500.00).
fn payment_amount() -> impl Strategy<Value = Decimal> {
    (1i64..50_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a tax rate with up to 2 decimals (0 to 100).
fn tax_rate() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|v| Decimal::new(v, 2))
}

fn line() -> impl Strategy<Value = OrderLine> {
    (1i32..50, price()).prop_map(|(quantity, unit_price)| OrderLine {
        product_id: ProductId::new(),
        quantity,
        unit_price,
    })
}

fn status() -> impl Strategy<Value = OrderStatus> {
    prop::sample::select(OrderStatus::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_subtotal_is_sum_of_lines(lines in prop::collection::vec(line(), 1..20)) {
        let mut expected = Decimal::ZERO;
        for l in &lines {
            let mut line_total = Decimal::ZERO;
            for _ in 0..l.quantity {
                line_total += l.unit_price;
            }
            expected += line_total;
        }
        prop_assert_eq!(OrderService::subtotal(&lines), expected);
    }

    #[test]
    fn prop_invoice_total_formula(
        subtotal in price(),
        rate in tax_rate(),
        discount_cents in 0i64..10_000i64,
    ) {
        let discount = Decimal::new(discount_cents, 2);
        let terms = InvoiceTerms { tax_rate: rate, discount };
        let expected = round_money(subtotal + subtotal * rate / Decimal::ONE_HUNDRED - discount);

        match InvoiceService::compute_totals(subtotal, terms) {
            Ok(totals) => {
                prop_assert_eq!(totals.total_amount, expected);
                prop_assert!(totals.total_amount >= Decimal::ZERO);
            }
            Err(LedgerError::NegativeTotal(total)) => {
                prop_assert!(expected < Decimal::ZERO);
                prop_assert_eq!(total, expected);
            }
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    #[test]
    fn prop_payments_never_exceed_total(
        total in price(),
        attempts in prop::collection::vec(payment_amount(), 1..15),
    ) {
        let invoice_id = InvoiceId::new();
        let mut accepted: Vec<Decimal> = Vec::new();

        for amount in attempts {
            let balance = InvoiceBalance::compute(total, accepted.iter().copied());
            match PaymentService::validate(invoice_id, amount, &balance) {
                Ok(outcome) => {
                    accepted.push(amount);
                    prop_assert!(outcome.balance_after.total_paid <= total);
                    prop_assert_eq!(
                        outcome.new_status,
                        InvoiceStatus::derive(total, outcome.balance_after.total_paid)
                    );
                }
                Err(LedgerError::Overpayment { remaining, .. }) => {
                    prop_assert!(amount > remaining);
                    prop_assert_eq!(remaining, balance.remaining);
                }
                Err(other) => prop_assert!(false, "unexpected error {other:?}"),
            }
        }

        let paid: Decimal = accepted.iter().copied().sum();
        prop_assert!(paid <= total);
    }

    #[test]
    fn prop_strict_edges_are_permissive_edges(from in status(), to in status()) {
        if OrderTransitions::is_valid_transition(TransitionPolicy::Strict, from, to) {
            prop_assert!(OrderTransitions::is_valid_transition(TransitionPolicy::Permissive, from, to));
        }
        let same = OrderTransitions::check(TransitionPolicy::Strict, from, from);
        prop_assert!(same.is_ok());
    }
}
