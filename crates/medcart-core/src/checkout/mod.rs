//! Checkout module.
//!
//! Request and response payloads for the two submission paths, and the
//! stock re-check that runs before either is sent.

mod order;
mod revalidate;
mod sale;

pub use order::{
    OrderItemRequest, OrderPaymentMode, OrderRequest, OrderStatus, OrderedItem, PaymentOutcome,
    PaymentStatus, PlacedOrder,
};
pub use revalidate::{revalidate, StockShortfall};
pub use sale::{CompletedSale, SaleItem, SalePaymentMode, SaleRequest};
