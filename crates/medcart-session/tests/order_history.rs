//! Order history and payment retries.

mod common;

use common::{medicine, FakeBackend};
use medcart_core::checkout::{OrderPaymentMode, PaymentOutcome, PaymentStatus};
use medcart_core::ledger::SurchargePolicy;
use medcart_core::{Currency, LedgerError, OrderId, ProductId};
use medcart_session::{CartSession, CheckoutOutcome, GatewayError, OrderHistory, SessionError};
use medcart_store::{LedgerRepository, MemoryStore};
use std::sync::Arc;

fn declined() -> PaymentOutcome {
    PaymentOutcome {
        success: false,
        message: "Payment failed".to_string(),
    }
}

async fn place(backend: &Arc<FakeBackend>, mode: OrderPaymentMode) -> CheckoutOutcome {
    let repo = LedgerRepository::new(MemoryStore::new(), Currency::INR);
    let mut cart = CartSession::open(
        repo,
        SurchargePolicy::delivery(Currency::INR),
        Arc::clone(backend),
        Arc::clone(backend),
    )
    .unwrap();
    cart.refresh_catalog().await.unwrap();
    cart.add(ProductId::new(1), 1).unwrap();
    cart.checkout("12 MG Road", mode).await.unwrap()
}

fn backend() -> Arc<FakeBackend> {
    FakeBackend::new(vec![medicine(1, "Paracetamol 500mg", 10.0, 50)])
}

#[tokio::test]
async fn test_declined_order_can_be_paid_later() {
    let backend = backend();
    backend.answer_payment(Ok(declined()));
    let outcome = place(&backend, OrderPaymentMode::UPI).await;
    assert!(matches!(outcome, CheckoutOutcome::PaymentFailed { .. }));

    let history = OrderHistory::new(Arc::clone(&backend));
    let pending = history.awaiting_payment().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].payment_status, PaymentStatus::Failed);

    backend.answer_payment(Ok(PaymentOutcome {
        success: true,
        message: "Payment successful".to_string(),
    }));
    let retried = history.retry_payment(pending[0].id).await.unwrap();
    assert!(matches!(retried, CheckoutOutcome::Paid { ref message, .. } if message == "Payment successful"));
    assert_eq!(
        backend.payments.lock().unwrap().last(),
        Some(&(pending[0].id, OrderPaymentMode::UPI))
    );

    assert!(history.awaiting_payment().await.unwrap().is_empty());
    let err = history.retry_payment(pending[0].id).await.unwrap_err();
    assert!(matches!(err, SessionError::Ledger(LedgerError::Validation(_))));
}

#[tokio::test]
async fn test_declined_again_is_an_outcome() {
    let backend = backend();
    backend.answer_payment(Ok(declined()));
    let order_id = place(&backend, OrderPaymentMode::UPI).await.order().id;

    let history = OrderHistory::new(Arc::clone(&backend));
    let retried = history.retry_payment(order_id).await.unwrap();
    assert!(matches!(retried, CheckoutOutcome::PaymentFailed { .. }));
    assert_eq!(history.awaiting_payment().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_cash_on_delivery_is_not_payable() {
    let backend = backend();
    let order_id = place(&backend, OrderPaymentMode::COD).await.order().id;

    let history = OrderHistory::new(Arc::clone(&backend));
    assert_eq!(history.list().await.unwrap().len(), 1);
    assert!(history.awaiting_payment().await.unwrap().is_empty());

    let err = history.retry_payment(order_id).await.unwrap_err();
    assert!(matches!(err, SessionError::Ledger(LedgerError::Validation(_))));
    assert!(backend.payments.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_order() {
    let backend = backend();
    let history = OrderHistory::new(Arc::clone(&backend));

    let err = history.retry_payment(OrderId::new(42)).await.unwrap_err();
    assert!(err.user_message().contains("not found"));
}

#[tokio::test]
async fn test_payment_transport_error_surfaces() {
    let backend = backend();
    backend.answer_payment(Ok(declined()));
    let order_id = place(&backend, OrderPaymentMode::UPI).await.order().id;

    backend.answer_payment(Err(GatewayError::Timeout("10s".to_string())));
    let history = OrderHistory::new(Arc::clone(&backend));
    let err = history.retry_payment(order_id).await.unwrap_err();
    assert!(matches!(err, SessionError::Gateway(GatewayError::Timeout(_))));
}
