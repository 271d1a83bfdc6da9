//! Backend seams.
//!
//! Sessions never build HTTP requests themselves. They go through these
//! traits, which [`crate::ApiClient`] implements for the real backend and
//! tests implement with fakes.

use crate::GatewayError;
use async_trait::async_trait;
use medcart_core::catalog::MedicineRecord;
use medcart_core::checkout::{
    CompletedSale, OrderPaymentMode, OrderRequest, PaymentOutcome, PlacedOrder, SaleRequest,
};
use medcart_core::OrderId;
use std::sync::Arc;

/// Somewhere to fetch the medicine catalog from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<MedicineRecord>, GatewayError>;
}

/// Places customer orders.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, GatewayError>;

    /// Settle an existing order. Only meaningful for online payment modes.
    async fn pay_order(
        &self,
        order_id: OrderId,
        mode: OrderPaymentMode,
    ) -> Result<PaymentOutcome, GatewayError>;

    /// The signed-in customer's orders, newest first.
    async fn list_orders(&self) -> Result<Vec<PlacedOrder>, GatewayError>;
}

/// Records counter sales.
#[async_trait]
pub trait SaleGateway: Send + Sync {
    async fn record_sale(&self, request: &SaleRequest) -> Result<CompletedSale, GatewayError>;
}

#[async_trait]
impl<T: CatalogSource + ?Sized> CatalogSource for Arc<T> {
    async fn fetch_catalog(&self) -> Result<Vec<MedicineRecord>, GatewayError> {
        (**self).fetch_catalog().await
    }
}

#[async_trait]
impl<T: OrderGateway + ?Sized> OrderGateway for Arc<T> {
    async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, GatewayError> {
        (**self).place_order(request).await
    }

    async fn pay_order(
        &self,
        order_id: OrderId,
        mode: OrderPaymentMode,
    ) -> Result<PaymentOutcome, GatewayError> {
        (**self).pay_order(order_id, mode).await
    }

    async fn list_orders(&self) -> Result<Vec<PlacedOrder>, GatewayError> {
        (**self).list_orders().await
    }
}

#[async_trait]
impl<T: SaleGateway + ?Sized> SaleGateway for Arc<T> {
    async fn record_sale(&self, request: &SaleRequest) -> Result<CompletedSale, GatewayError> {
        (**self).record_sale(request).await
    }
}
