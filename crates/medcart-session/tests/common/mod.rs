//! In-process backend used by the session tests.

#![allow(dead_code)]

use async_trait::async_trait;
use medcart_core::catalog::MedicineRecord;
use medcart_core::checkout::{
    CompletedSale, OrderPaymentMode, OrderRequest, OrderStatus, PaymentOutcome, PaymentStatus,
    PlacedOrder, SaleRequest,
};
use medcart_core::{OrderId, ProductId, SaleId};
use medcart_session::{CatalogSource, GatewayError, OrderGateway, SaleGateway};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn medicine(id: i64, name: &str, price: f64, stock: i64) -> MedicineRecord {
    MedicineRecord {
        id: ProductId::new(id),
        name: name.to_string(),
        category: Some("General".to_string()),
        description: None,
        price,
        stock,
        low_stock_threshold: Some(10),
        manufacturer: None,
    }
}

/// Records every request and answers from canned state.
pub struct FakeBackend {
    pub history: Mutex<Vec<PlacedOrder>>,
    pub catalog: Mutex<Vec<MedicineRecord>>,
    pub catalog_error: Mutex<Option<GatewayError>>,
    pub catalog_calls: AtomicUsize,
    pub order_error: Mutex<Option<GatewayError>>,
    pub payment: Mutex<Result<PaymentOutcome, GatewayError>>,
    pub sale_error: Mutex<Option<GatewayError>>,
    pub orders: Mutex<Vec<OrderRequest>>,
    pub payments: Mutex<Vec<(OrderId, OrderPaymentMode)>>,
    pub sales: Mutex<Vec<SaleRequest>>,
}

impl FakeBackend {
    pub fn new(catalog: Vec<MedicineRecord>) -> Arc<Self> {
        Arc::new(Self {
            history: Mutex::new(Vec::new()),
            catalog: Mutex::new(catalog),
            catalog_error: Mutex::new(None),
            catalog_calls: AtomicUsize::new(0),
            order_error: Mutex::new(None),
            payment: Mutex::new(Ok(PaymentOutcome {
                success: true,
                message: "Payment successful".to_string(),
            })),
            sale_error: Mutex::new(None),
            orders: Mutex::new(Vec::new()),
            payments: Mutex::new(Vec::new()),
            sales: Mutex::new(Vec::new()),
        })
    }

    pub fn set_stock(&self, id: i64, stock: i64) {
        for record in self.catalog.lock().unwrap().iter_mut() {
            if record.id == ProductId::new(id) {
                record.stock = stock;
            }
        }
    }

    pub fn fail_orders(&self, error: GatewayError) {
        *self.order_error.lock().unwrap() = Some(error);
    }

    pub fn fail_sales(&self, error: GatewayError) {
        *self.sale_error.lock().unwrap() = Some(error);
    }

    pub fn answer_payment(&self, answer: Result<PaymentOutcome, GatewayError>) {
        *self.payment.lock().unwrap() = answer;
    }

    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for FakeBackend {
    async fn fetch_catalog(&self) -> Result<Vec<MedicineRecord>, GatewayError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.catalog_error.lock().unwrap().clone() {
            return Err(e);
        }
        Ok(self.catalog.lock().unwrap().clone())
    }
}

#[async_trait]
impl OrderGateway for FakeBackend {
    async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, GatewayError> {
        if let Some(e) = self.order_error.lock().unwrap().clone() {
            return Err(e);
        }
        let mut orders = self.orders.lock().unwrap();
        orders.push(request.clone());
        let n = orders.len() as i64;
        let order = PlacedOrder {
            id: OrderId::new(n),
            order_number: format!("ORD-{n:05}"),
            status: OrderStatus::Placed,
            total_amount: 0.0,
            payment_mode: request.payment_mode,
            payment_status: PaymentStatus::Pending,
            shipping_address: request.shipping_address.clone(),
            created_at: None,
            items: Vec::new(),
        };
        self.history.lock().unwrap().insert(0, order.clone());
        Ok(order)
    }

    async fn pay_order(
        &self,
        order_id: OrderId,
        mode: OrderPaymentMode,
    ) -> Result<PaymentOutcome, GatewayError> {
        self.payments.lock().unwrap().push((order_id, mode));
        let answer = self.payment.lock().unwrap().clone();
        if let Ok(outcome) = &answer {
            for order in self.history.lock().unwrap().iter_mut() {
                if order.id == order_id && mode == OrderPaymentMode::UPI {
                    order.payment_status = if outcome.success {
                        PaymentStatus::Success
                    } else {
                        PaymentStatus::Failed
                    };
                }
            }
        }
        answer
    }

    async fn list_orders(&self) -> Result<Vec<PlacedOrder>, GatewayError> {
        Ok(self.history.lock().unwrap().clone())
    }
}

#[async_trait]
impl SaleGateway for FakeBackend {
    async fn record_sale(&self, request: &SaleRequest) -> Result<CompletedSale, GatewayError> {
        if let Some(e) = self.sale_error.lock().unwrap().clone() {
            return Err(e);
        }
        let mut sales = self.sales.lock().unwrap();
        sales.push(request.clone());
        let n = sales.len() as i64;
        let subtotal: f64 = request.items.iter().map(|i| i.subtotal).sum();
        let tax = (subtotal * 0.05 * 100.0).round() / 100.0;
        Ok(CompletedSale {
            id: SaleId::new(n),
            invoice_number: format!("INV-{n:06}"),
            customer_name: request.customer_name.clone(),
            customer_phone: request.customer_phone.clone(),
            subtotal,
            tax,
            total_amount: subtotal + tax,
            payment_mode: request.payment_mode,
        })
    }
}
