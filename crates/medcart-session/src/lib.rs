//! Cart and billing sessions for the MedCart pharmacy client.
//!
//! A session owns one ledger plus everything around it: the catalog
//! snapshot it validates against, the repository it persists to (cart flow
//! only), the backend gateways it submits through and the observers that
//! redraw on change. There are no globals; build one session per flow.
//!
//! - [`CartSession`]: customer cart, persisted, checked out as an order
//! - [`BillingSession`]: counter bill, in memory, completed as a sale
//! - [`OrderHistory`]: past orders and payment retries
//! - [`ApiClient`]: `reqwest` implementation of the gateway traits

mod billing;
mod cart;
mod catalog;
mod client;
mod error;
mod gateway;
mod observer;
mod orders;

pub use billing::BillingSession;
pub use cart::{CartSession, CheckoutOutcome};
pub use catalog::{CatalogApply, CatalogTicket};
pub use client::{ApiClient, ApiClientConfig, CatalogFilter, CatalogScope};
pub use error::{GatewayError, SessionError};
pub use gateway::{CatalogSource, OrderGateway, SaleGateway};
pub use observer::LedgerObserver;
pub use orders::OrderHistory;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ApiClient, ApiClientConfig, BillingSession, CartSession, CatalogApply, CatalogFilter,
        CatalogScope, CatalogSource, CatalogTicket, CheckoutOutcome, GatewayError,
        LedgerObserver, OrderGateway, OrderHistory, SaleGateway, SessionError,
    };
}
