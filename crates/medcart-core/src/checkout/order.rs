//! Online order payloads.

use crate::error::LedgerError;
use crate::ids::{OrderId, ProductId};
use crate::ledger::Ledger;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment mode for online orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderPaymentMode {
    UPI,
    /// Cash on delivery.
    COD,
}

impl OrderPaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderPaymentMode::UPI => "UPI",
            OrderPaymentMode::COD => "COD",
        }
    }
}

impl fmt::Display for OrderPaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderPaymentMode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "UPI" => Ok(OrderPaymentMode::UPI),
            "COD" => Ok(OrderPaymentMode::COD),
            other => Err(LedgerError::Validation(format!(
                "unknown payment mode: {other}"
            ))),
        }
    }
}

/// Order status, owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Placed,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "Placed",
            OrderStatus::Packed => "Packed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// Payment status, owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Success => "Success",
            PaymentStatus::Failed => "Failed",
        }
    }
}

/// One requested line of an online order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItemRequest {
    pub medicine_id: ProductId,
    pub quantity: i64,
}

/// Body of `POST /user/orders`.
///
/// Only ids and quantities are sent; the backend prices the order itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub shipping_address: String,
    pub payment_mode: OrderPaymentMode,
}

impl OrderRequest {
    /// Build the request from a cart ledger.
    pub fn from_ledger(
        ledger: &Ledger,
        shipping_address: &str,
        payment_mode: OrderPaymentMode,
    ) -> Result<Self, LedgerError> {
        if ledger.is_empty() {
            return Err(LedgerError::EmptyLedger);
        }
        let shipping_address = shipping_address.trim();
        if shipping_address.is_empty() {
            return Err(LedgerError::Validation(
                "shipping address is required".to_string(),
            ));
        }

        Ok(Self {
            items: ledger
                .lines()
                .iter()
                .map(|line| OrderItemRequest {
                    medicine_id: line.product_id(),
                    quantity: line.quantity(),
                })
                .collect(),
            shipping_address: shipping_address.to_string(),
            payment_mode,
        })
    }
}

/// A line of an order as the backend priced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderedItem {
    pub medicine_id: ProductId,
    pub medicine_name: String,
    pub quantity: i64,
    pub price: f64,
    pub subtotal: f64,
}

/// An order as the backend reports it, both right after placing it and in
/// the order history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacedOrder {
    pub id: OrderId,
    pub order_number: String,
    #[serde(default)]
    pub status: OrderStatus,
    pub total_amount: f64,
    pub payment_mode: OrderPaymentMode,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub shipping_address: String,
    /// Backend timestamp, passed through as sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderedItem>,
}

impl PlacedOrder {
    /// An online order whose payment has not gone through yet.
    pub fn awaiting_payment(&self) -> bool {
        self.check_payable().is_ok()
    }

    /// Whether another payment attempt can be made for this order.
    pub fn check_payable(&self) -> Result<(), LedgerError> {
        if self.payment_mode != OrderPaymentMode::UPI {
            return Err(LedgerError::Validation(format!(
                "order {} is paid on delivery",
                self.order_number
            )));
        }
        if self.payment_status == PaymentStatus::Success {
            return Err(LedgerError::Validation(format!(
                "order {} is already paid",
                self.order_number
            )));
        }
        if self.status.is_terminal() {
            return Err(LedgerError::Validation(format!(
                "order {} is {}",
                self.order_number,
                self.status.as_str()
            )));
        }
        Ok(())
    }
}

/// Body of the payment call's response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
