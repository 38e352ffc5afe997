//! Concurrent payment tests.
//!
//! Many payments race against one invoice; the row lock plus in-transaction
//! balance check must let exactly the affordable ones through.
//!
//! The in-memory SQLite pool has a single connection, so there the racing
//! calls are serialized by the pool and the tests check that interleaved
//! calls stay consistent. The `#[ignore]`d PostgreSQL variant exercises the
//! `FOR UPDATE` row lock with real parallel transactions:
//!
//! ```text
//! DATABASE_URL=postgres://... cargo test -p inventra-db --test concurrent_test -- --ignored
//! ```

mod common;

use std::env;

use chrono::Utc;
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use inventra_core::ledger::{InvoiceStatus, LedgerError, PaymentMethod};
use inventra_db::repositories::{
    AddPaymentInput, CreateInvoiceInput, InvoiceRepository, OrderRepository, PaymentRepository,
};

use inventra_db::migration::Migrator;

use common::{client, item, order_input, product, setup_db};

/// Twelve payments of 5.00 race against a 50.00 invoice: ten fit.
async fn race_payments(db: &DatabaseConnection) {
    let sku = format!("W-{}", Uuid::new_v4());
    let widget = product(db, &sku, None, dec!(10.00), 100, 5).await;
    let acme = client(db, "Acme").await;

    let order = OrderRepository::new(db.clone())
        .create_order(order_input(&acme, vec![item(&widget, 5)]))
        .await
        .unwrap();
    let invoice = InvoiceRepository::new(db.clone())
        .create_invoice(CreateInvoiceInput {
            order_id: order.order.id,
            tax_rate: Some(Decimal::ZERO),
            discount: Some(Decimal::ZERO),
            notes: None,
            created_by: Uuid::new_v4(),
        })
        .await
        .unwrap();
    assert_eq!(invoice.total_amount, dec!(50.00));

    let payments = PaymentRepository::new(db.clone());
    let attempts = (0..12).map(|_| {
        let payments = payments.clone();
        async move {
            payments
                .add_payment(AddPaymentInput {
                    invoice_id: invoice.id,
                    amount: dec!(5.00),
                    method: PaymentMethod::BankTransfer,
                    reference: None,
                    notes: None,
                    payment_date: Utc::now().date_naive(),
                    created_by: Uuid::new_v4(),
                })
                .await
        }
    });
    let results = join_all(attempts).await;

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let overpaid = results
        .iter()
        .filter(|r| matches!(r, Err(LedgerError::Overpayment { .. })))
        .count();
    assert_eq!(accepted, 10);
    assert_eq!(overpaid, 2);

    let balance = InvoiceRepository::new(db.clone())
        .get_invoice_with_balance(invoice.id)
        .await
        .unwrap();
    assert_eq!(balance.total_paid, dec!(50.00));
    assert_eq!(balance.remaining, Decimal::ZERO);
    assert_eq!(InvoiceStatus::from(balance.invoice.status), InvoiceStatus::Paid);
}

#[tokio::test]
async fn test_concurrent_payments_never_exceed_total() {
    let db = setup_db().await;
    race_payments(&db).await;
}

#[tokio::test]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_concurrent_payments_never_exceed_total_postgres() {
    let url = env::var("DATABASE_URL").expect("DATABASE_URL");
    let mut options = ConnectOptions::new(url);
    options.max_connections(12).min_connections(2);
    let db = Database::connect(options).await.expect("postgres");
    Migrator::up(&db, None).await.expect("migrations");
    race_payments(&db).await;
}

#[tokio::test]
async fn test_concurrent_invoice_creation_yields_one_invoice() {
    let db = setup_db().await;
    let widget = product(&db, "W-001", None, dec!(10.00), 100, 5).await;
    let acme = client(&db, "Acme").await;
    let order = OrderRepository::new(db.clone())
        .create_order(order_input(&acme, vec![item(&widget, 1)]))
        .await
        .unwrap();

    let invoices = InvoiceRepository::new(db.clone());
    let attempts = (0..4).map(|_| {
        let invoices = invoices.clone();
        let order_id = order.order.id;
        async move {
            invoices
                .create_invoice(CreateInvoiceInput {
                    order_id,
                    tax_rate: None,
                    discount: None,
                    notes: None,
                    created_by: Uuid::new_v4(),
                })
                .await
        }
    });
    let results = join_all(attempts).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.http_status_code() == 409)
    );
}
