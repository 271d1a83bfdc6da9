//! Ledger module.
//!
//! Contains the ledger, its line items, and the surcharge policies that
//! turn a subtotal into a grand total.

mod ledger;
mod line;
mod surcharge;

pub use ledger::{Adjustment, Ledger, LedgerChange};
pub use line::LineItem;
pub use surcharge::{SurchargeKind, SurchargePolicy, Totals, DEFAULT_DELIVERY_FEE_CENTS};
