//! Cart and billing ledger for the MedCart pharmacy client.
//!
//! This crate is pure: no I/O, no clocks, no globals.
//!
//! - **Ledger**: ordered line items with merge-on-add, stock ceilings and
//!   derived subtotals
//! - **Surcharge**: flat delivery fee or proportional tax, injected per flow
//! - **Catalog**: the point-in-time snapshot the ledger validates against
//! - **Checkout**: submission payloads and stock re-validation
//!
//! # Example
//!
//! ```
//! use medcart_core::prelude::*;
//!
//! let mut ledger = Ledger::new(Currency::INR);
//! ledger
//!     .add_or_merge(ProductId::new(1), "Paracetamol", Money::new(1000, Currency::INR), 5, 2)
//!     .unwrap();
//!
//! let totals = ledger.totals(&SurchargePolicy::delivery(Currency::INR)).unwrap();
//! assert_eq!(totals.grand_total.display(), "\u{20b9}70.00");
//! ```

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod money;

pub use error::LedgerError;
pub use ids::*;
pub use ledger::Ledger;
pub use money::{Currency, Money, TaxRate};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::LedgerError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money, TaxRate};

    pub use crate::catalog::{CatalogEntry, CatalogSnapshot, MedicineRecord};

    pub use crate::ledger::{
        Adjustment, Ledger, LedgerChange, LineItem, SurchargeKind, SurchargePolicy, Totals,
    };

    pub use crate::checkout::{
        revalidate, CompletedSale, OrderPaymentMode, OrderRequest, OrderStatus, PaymentOutcome,
        PlacedOrder, SalePaymentMode, SaleRequest, StockShortfall,
    };
}
