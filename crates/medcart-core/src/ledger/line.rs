//! Line items.

use crate::error::LedgerError;
use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// One product entry within a ledger.
///
/// The subtotal is not stored; [`LineItem::subtotal`] derives it from the
/// price and quantity on every call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    product_id: ProductId,
    label: String,
    unit_price: Money,
    quantity: i64,
    stock_ceiling: i64,
}

impl LineItem {
    pub(crate) fn new(
        product_id: ProductId,
        label: String,
        unit_price: Money,
        quantity: i64,
        stock_ceiling: i64,
    ) -> Result<Self, LedgerError> {
        let item = Self {
            product_id,
            label,
            unit_price,
            quantity,
            stock_ceiling,
        };
        item.check()?;
        Ok(item)
    }

    /// Catalog product this line refers to.
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Display name captured when the line was added.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Unit price captured when the line was added.
    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Stock available at the last catalog snapshot.
    pub fn stock_ceiling(&self) -> i64 {
        self.stock_ceiling
    }

    /// `unit_price * quantity`.
    pub fn subtotal(&self) -> Money {
        // check() guarantees the product fits
        Money::new(
            self.unit_price.amount_cents.saturating_mul(self.quantity),
            self.unit_price.currency,
        )
    }

    /// Quantity this line would have after `delta`, or None on overflow.
    pub(crate) fn quantity_after(&self, delta: i64) -> Option<i64> {
        self.quantity.checked_add(delta)
    }

    /// Set a quantity already validated by the ledger.
    pub(crate) fn set_quantity(&mut self, quantity: i64) -> Result<(), LedgerError> {
        let previous = self.quantity;
        self.quantity = quantity;
        if let Err(e) = self.check() {
            self.quantity = previous;
            return Err(e);
        }
        Ok(())
    }

    pub(crate) fn set_stock_ceiling(&mut self, stock_ceiling: i64) {
        self.stock_ceiling = stock_ceiling;
    }

    /// Check the per-line invariants.
    pub(crate) fn check(&self) -> Result<(), LedgerError> {
        if self.quantity < 1 {
            return Err(LedgerError::InvalidQuantity(self.quantity));
        }
        if self.quantity > self.stock_ceiling {
            return Err(LedgerError::StockLimitExceeded {
                product_id: self.product_id,
                requested: self.quantity,
                available: self.stock_ceiling,
            });
        }
        if self.unit_price.is_negative() {
            return Err(LedgerError::Validation(format!(
                "negative unit price for product {}",
                self.product_id
            )));
        }
        self.unit_price
            .try_multiply(self.quantity)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }
}
