//! Cart session behaviour against an in-process backend.

mod common;

use common::{medicine, FakeBackend};
use medcart_core::checkout::{OrderPaymentMode, PaymentOutcome};
use medcart_core::ledger::{Ledger, LedgerChange, SurchargePolicy, Totals};
use medcart_core::{Currency, LedgerError, ProductId};
use medcart_session::{CartSession, CatalogApply, CheckoutOutcome, GatewayError, SessionError};
use medcart_store::{FileStore, KeyValueStore, LedgerRepository, MemoryStore, DEFAULT_CART_KEY};
use std::path::Path;
use std::sync::{Arc, Mutex};

type Session<S> = CartSession<S, Arc<FakeBackend>, Arc<FakeBackend>>;

const PARACETAMOL: ProductId = ProductId::new(1);
const CETIRIZINE: ProductId = ProductId::new(2);

fn backend() -> Arc<FakeBackend> {
    FakeBackend::new(vec![
        medicine(1, "Paracetamol 500mg", 10.0, 5),
        medicine(2, "Cetirizine 10mg", 100.0, 20),
        medicine(3, "Amoxicillin 250mg", 45.5, 0),
    ])
}

async fn open<S: KeyValueStore>(store: S, backend: &Arc<FakeBackend>) -> Session<S> {
    let repo = LedgerRepository::new(store, Currency::INR);
    let mut session = CartSession::open(
        repo,
        SurchargePolicy::delivery(Currency::INR),
        Arc::clone(backend),
        Arc::clone(backend),
    )
    .unwrap();
    session.refresh_catalog().await.unwrap();
    session
}

fn file_store(dir: &Path) -> FileStore {
    FileStore::open(dir).unwrap()
}

#[tokio::test]
async fn test_add_merge_and_ceiling() {
    let backend = backend();
    let mut cart = open(MemoryStore::new(), &backend).await;

    assert_eq!(cart.add(PARACETAMOL, 2).unwrap(), LedgerChange::Added(PARACETAMOL));
    assert_eq!(cart.totals().unwrap().subtotal.amount_cents, 2000);

    assert_eq!(cart.add(PARACETAMOL, 1).unwrap(), LedgerChange::Merged(PARACETAMOL));
    let line = cart.ledger().line(PARACETAMOL).unwrap();
    assert_eq!(line.quantity(), 3);
    assert_eq!(line.subtotal().amount_cents, 3000);
    assert_eq!(cart.ledger().len(), 1);

    let err = cart.adjust(PARACETAMOL, 3).unwrap_err();
    assert!(err.is_warning());
    assert_eq!(err.user_message(), "Only 5 units available");
    assert_eq!(cart.ledger().line(PARACETAMOL).unwrap().quantity(), 3);
}

#[tokio::test]
async fn test_delivery_fee_only_when_non_empty() {
    let backend = backend();
    let mut cart = open(MemoryStore::new(), &backend).await;

    let empty = cart.totals().unwrap();
    assert_eq!(empty.surcharge.amount_cents, 0);
    assert_eq!(empty.grand_total.amount_cents, 0);

    cart.add(CETIRIZINE, 1).unwrap();
    let totals = cart.totals().unwrap();
    assert_eq!(totals.subtotal.amount_cents, 10_000);
    assert_eq!(totals.surcharge.amount_cents, 5_000);
    assert_eq!(totals.grand_total.amount_cents, 15_000);
}

#[tokio::test]
async fn test_negative_adjust_removes_line() {
    let backend = backend();
    let mut cart = open(MemoryStore::new(), &backend).await;
    cart.add(PARACETAMOL, 2).unwrap();
    cart.add(CETIRIZINE, 1).unwrap();

    assert_eq!(
        cart.adjust(PARACETAMOL, -2).unwrap(),
        LedgerChange::Removed(PARACETAMOL)
    );
    assert!(cart.ledger().line(PARACETAMOL).is_none());
    assert_eq!(cart.totals().unwrap().grand_total.amount_cents, 15_000);
}

#[tokio::test]
async fn test_out_of_stock_product_is_rejected() {
    let backend = backend();
    let mut cart = open(MemoryStore::new(), &backend).await;

    let err = cart.add(ProductId::new(3), 1).unwrap_err();
    assert!(err.is_warning());
    assert_eq!(err.user_message(), "Out of stock");
    assert!(cart.ledger().is_empty());
}

#[tokio::test]
async fn test_cart_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend();

    let saved = {
        let mut cart = open(file_store(dir.path()), &backend).await;
        cart.add(PARACETAMOL, 2).unwrap();
        cart.add(CETIRIZINE, 4).unwrap();
        cart.ledger().clone()
    };

    let cart = open(file_store(dir.path()), &backend).await;
    assert_eq!(cart.ledger(), &saved);
    assert_eq!(cart.ledger().item_count(), 6);
}

#[tokio::test]
async fn test_corrupt_saved_cart_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    file_store(dir.path())
        .set(DEFAULT_CART_KEY, b"{\"version\":1,\"ledger\":")
        .unwrap();

    let backend = backend();
    let mut cart = open(file_store(dir.path()), &backend).await;
    assert!(cart.ledger().is_empty());

    // still usable, and the next save replaces the bad data
    cart.add(PARACETAMOL, 1).unwrap();
    let reopened = open(file_store(dir.path()), &backend).await;
    assert_eq!(reopened.ledger().item_count(), 1);
}

#[tokio::test]
async fn test_stale_catalog_response_is_discarded() {
    let backend = backend();
    let mut cart = open(MemoryStore::new(), &backend).await;

    let first = cart.begin_catalog_load();
    let second = cart.begin_catalog_load();

    let applied = cart
        .finish_catalog_load(second, Ok(vec![medicine(1, "Paracetamol 500mg", 10.0, 8)]))
        .unwrap();
    assert_eq!(applied, CatalogApply::Applied { entries: 1 });

    let late = cart
        .finish_catalog_load(first, Ok(vec![medicine(1, "Paracetamol 500mg", 10.0, 1)]))
        .unwrap();
    assert_eq!(late, CatalogApply::Discarded);
    assert_eq!(cart.catalog().stock_of(PARACETAMOL), Some(8));
}

#[tokio::test]
async fn test_detached_session_ignores_catalog() {
    let backend = backend();
    let mut cart = open(MemoryStore::new(), &backend).await;
    let before = cart.catalog().clone();

    backend.set_stock(1, 99);
    cart.detach();
    assert_eq!(cart.refresh_catalog().await.unwrap(), CatalogApply::Discarded);
    assert_eq!(cart.catalog(), &before);
}

#[tokio::test]
async fn test_failed_catalog_load_keeps_snapshot() {
    let backend = backend();
    let mut cart = open(MemoryStore::new(), &backend).await;

    *backend.catalog_error.lock().unwrap() = Some(GatewayError::Timeout("10s".into()));
    let err = cart.refresh_catalog().await.unwrap_err();
    assert!(matches!(err, SessionError::Gateway(GatewayError::Timeout(_))));
    assert_eq!(cart.catalog().len(), 3);
}

#[tokio::test]
async fn test_cod_checkout_clears_cart() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend();
    let mut cart = open(file_store(dir.path()), &backend).await;
    cart.add(PARACETAMOL, 2).unwrap();
    cart.add(CETIRIZINE, 1).unwrap();

    let outcome = cart
        .checkout("  12 MG Road, Bengaluru  ", OrderPaymentMode::COD)
        .await
        .unwrap();

    assert!(matches!(outcome, CheckoutOutcome::CashOnDelivery { .. }));
    assert!(cart.ledger().is_empty());
    assert!(backend.payments.lock().unwrap().is_empty());

    let orders = backend.orders.lock().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].shipping_address, "12 MG Road, Bengaluru");
    assert_eq!(orders[0].items.len(), 2);
    assert_eq!(orders[0].items[0].medicine_id, PARACETAMOL);
    assert_eq!(orders[0].items[0].quantity, 2);

    let reopened = open(file_store(dir.path()), &backend).await;
    assert!(reopened.ledger().is_empty());
}

#[tokio::test]
async fn test_upi_checkout_pays_order() {
    let backend = backend();
    let mut cart = open(MemoryStore::new(), &backend).await;
    cart.add(CETIRIZINE, 1).unwrap();

    let outcome = cart.checkout("Flat 4", OrderPaymentMode::UPI).await.unwrap();
    match outcome {
        CheckoutOutcome::Paid { order, message } => {
            assert_eq!(order.order_number, "ORD-00001");
            assert_eq!(message, "Payment successful");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        *backend.payments.lock().unwrap(),
        vec![(medcart_core::OrderId::new(1), OrderPaymentMode::UPI)]
    );
}

#[tokio::test]
async fn test_declined_payment_still_clears_cart() {
    let backend = backend();
    backend.answer_payment(Ok(PaymentOutcome {
        success: false,
        message: "Payment failed. Please try again.".to_string(),
    }));
    let mut cart = open(MemoryStore::new(), &backend).await;
    cart.add(CETIRIZINE, 1).unwrap();

    let outcome = cart.checkout("Flat 4", OrderPaymentMode::UPI).await.unwrap();
    assert!(matches!(
        outcome,
        CheckoutOutcome::PaymentFailed { ref message, .. } if message == "Payment failed. Please try again."
    ));
    assert!(cart.ledger().is_empty());
}

#[tokio::test]
async fn test_payment_transport_error_is_reported_not_raised() {
    let backend = backend();
    backend.answer_payment(Err(GatewayError::Transport("connection reset".into())));
    let mut cart = open(MemoryStore::new(), &backend).await;
    cart.add(CETIRIZINE, 1).unwrap();

    let outcome = cart.checkout("Flat 4", OrderPaymentMode::UPI).await.unwrap();
    match outcome {
        CheckoutOutcome::PaymentFailed { message, .. } => {
            assert!(message.contains("connection reset"))
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(cart.ledger().is_empty());
}

#[tokio::test]
async fn test_failed_order_keeps_cart() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend();
    backend.fail_orders(GatewayError::Api {
        status: 400,
        detail: "Insufficient stock".to_string(),
    });
    let mut cart = open(file_store(dir.path()), &backend).await;
    cart.add(PARACETAMOL, 2).unwrap();
    let before = cart.ledger().clone();

    let err = cart
        .checkout("12 MG Road", OrderPaymentMode::COD)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Insufficient stock");
    assert_eq!(cart.ledger(), &before);

    let reopened = open(file_store(dir.path()), &backend).await;
    assert_eq!(reopened.ledger(), &before);
}

#[tokio::test]
async fn test_stock_drop_blocks_checkout() {
    let backend = backend();
    let mut cart = open(MemoryStore::new(), &backend).await;
    cart.add(PARACETAMOL, 3).unwrap();
    cart.add(CETIRIZINE, 1).unwrap();

    backend.set_stock(1, 2);
    let err = cart
        .checkout("12 MG Road", OrderPaymentMode::COD)
        .await
        .unwrap_err();

    match &err {
        SessionError::Ledger(LedgerError::StockChanged(shortfalls)) => {
            assert_eq!(shortfalls.len(), 1);
            assert_eq!(shortfalls[0].product_id, PARACETAMOL);
            assert_eq!(shortfalls[0].requested, 3);
            assert_eq!(shortfalls[0].available, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_warning());
    assert!(backend.orders.lock().unwrap().is_empty());
    assert_eq!(cart.ledger().line(PARACETAMOL).unwrap().quantity(), 3);
    assert_eq!(cart.catalog().stock_of(PARACETAMOL), Some(2));

    // the user fixes the quantity and checks out
    cart.adjust(PARACETAMOL, -1).unwrap();
    cart.checkout("12 MG Road", OrderPaymentMode::COD).await.unwrap();
    assert!(cart.ledger().is_empty());
}

#[tokio::test]
async fn test_blank_address_is_rejected() {
    let backend = backend();
    let mut cart = open(MemoryStore::new(), &backend).await;
    cart.add(PARACETAMOL, 1).unwrap();

    let err = cart.checkout("   ", OrderPaymentMode::COD).await.unwrap_err();
    assert!(matches!(err, SessionError::Ledger(LedgerError::Validation(_))));
    assert_eq!(cart.ledger().item_count(), 1);
}

#[tokio::test]
async fn test_observers_follow_checkout() {
    let backend = backend();
    let mut cart = open(MemoryStore::new(), &backend).await;
    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&changes);
    cart.subscribe(move |change: &LedgerChange, _: &Ledger, totals: &Totals| {
        sink.lock().unwrap().push((*change, totals.grand_total.amount_cents));
    });

    cart.add(PARACETAMOL, 1).unwrap();
    cart.checkout("12 MG Road", OrderPaymentMode::COD).await.unwrap();

    assert_eq!(
        *changes.lock().unwrap(),
        vec![
            (LedgerChange::Added(PARACETAMOL), 6_000),
            (LedgerChange::Cleared, 0),
        ]
    );
}

#[tokio::test]
async fn test_stock_drop_reports_new_ceilings_to_observers() {
    let backend = backend();
    let mut cart = open(MemoryStore::new(), &backend).await;
    cart.add(PARACETAMOL, 3).unwrap();
    cart.add(CETIRIZINE, 2).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    cart.subscribe(move |change: &LedgerChange, ledger: &Ledger, _: &Totals| {
        let ceiling = ledger.line(CETIRIZINE).map(|line| line.stock_ceiling());
        sink.lock().unwrap().push((*change, ceiling));
    });

    backend.set_stock(1, 0);
    backend.set_stock(2, 4);
    let err = cart
        .checkout("12 MG Road", OrderPaymentMode::COD)
        .await
        .unwrap_err();

    assert!(err.is_warning());
    assert_eq!(*seen.lock().unwrap(), vec![(LedgerChange::Reloaded, Some(4))]);
    assert_eq!(cart.ledger().line(PARACETAMOL).unwrap().stock_ceiling(), 5);
}

#[tokio::test]
async fn test_sign_out_discards_saved_cart() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend();
    let mut cart = open(file_store(dir.path()), &backend).await;
    cart.add(PARACETAMOL, 1).unwrap();

    cart.sign_out().unwrap();
    assert!(cart.ledger().is_empty());
    assert!(!file_store(dir.path()).exists(DEFAULT_CART_KEY).unwrap());
}

#[tokio::test]
async fn test_reload_picks_up_external_change() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend();
    let mut first = open(file_store(dir.path()), &backend).await;
    let mut second = open(file_store(dir.path()), &backend).await;

    second.add(CETIRIZINE, 2).unwrap();
    assert!(first.ledger().is_empty());

    first.reload().unwrap();
    assert_eq!(first.ledger().item_count(), 2);
}
