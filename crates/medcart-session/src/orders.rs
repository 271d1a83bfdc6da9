//! Order history and payment retries.

use crate::cart::CheckoutOutcome;
use crate::gateway::OrderGateway;
use crate::SessionError;
use medcart_core::checkout::{OrderPaymentMode, PlacedOrder};
use medcart_core::{LedgerError, OrderId};

/// The signed-in customer's past orders.
#[derive(Debug)]
pub struct OrderHistory<O> {
    orders: O,
}

impl<O: OrderGateway> OrderHistory<O> {
    pub fn new(orders: O) -> Self {
        Self { orders }
    }

    /// All orders, newest first.
    pub async fn list(&self) -> Result<Vec<PlacedOrder>, SessionError> {
        Ok(self.orders.list_orders().await?)
    }

    /// Online orders whose payment has not gone through.
    pub async fn awaiting_payment(&self) -> Result<Vec<PlacedOrder>, SessionError> {
        let mut orders = self.list().await?;
        orders.retain(PlacedOrder::awaiting_payment);
        Ok(orders)
    }

    /// Try the online payment of an existing order again.
    ///
    /// A declined payment is an outcome, not an error. Transport failures
    /// are returned as errors since nothing changed on the backend.
    pub async fn retry_payment(&self, order_id: OrderId) -> Result<CheckoutOutcome, SessionError> {
        let order = self
            .list()
            .await?
            .into_iter()
            .find(|order| order.id == order_id)
            .ok_or_else(|| LedgerError::Validation(format!("order {order_id} not found")))?;
        order.check_payable()?;

        let outcome = self
            .orders
            .pay_order(order.id, OrderPaymentMode::UPI)
            .await?;
        if outcome.success {
            tracing::info!(order_id = %order.id, "payment retry succeeded");
            Ok(CheckoutOutcome::Paid {
                order,
                message: outcome.message,
            })
        } else {
            tracing::warn!(order_id = %order.id, message = %outcome.message, "payment retry declined");
            Ok(CheckoutOutcome::PaymentFailed {
                order,
                message: outcome.message,
            })
        }
    }
}
