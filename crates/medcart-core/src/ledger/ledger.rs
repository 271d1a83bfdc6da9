//! The ledger: an ordered set of line items for one checkout or billing flow.

use crate::catalog::CatalogSnapshot;
use crate::error::LedgerError;
use crate::ids::ProductId;
use crate::ledger::{LineItem, SurchargePolicy, Totals};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What a successful mutation did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerChange {
    /// A new line was appended.
    Added(ProductId),
    /// An existing line absorbed more quantity.
    Merged(ProductId),
    /// A line's quantity was set.
    Updated(ProductId),
    /// A line was removed.
    Removed(ProductId),
    /// All lines were removed.
    Cleared,
    /// The whole ledger was replaced from storage.
    Reloaded,
}

/// Result of [`Ledger::adjust_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// The line now holds this quantity.
    Updated(i64),
    /// The quantity dropped below one and the line was removed.
    Removed,
}

impl Adjustment {
    pub fn change(&self, product_id: ProductId) -> LedgerChange {
        match self {
            Adjustment::Updated(_) => LedgerChange::Updated(product_id),
            Adjustment::Removed => LedgerChange::Removed(product_id),
        }
    }
}

/// Line items in insertion order, at most one per product.
///
/// Every failed mutation leaves the ledger exactly as it was.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ledger {
    currency: Currency,
    items: Vec<LineItem>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            items: Vec::new(),
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[LineItem] {
        &self.items
    }

    /// Get the line for a product.
    pub fn line(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.product_id() == product_id)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity()).sum()
    }

    /// Add a product, or merge into its existing line.
    ///
    /// The resulting quantity (merged total for an existing line) must not
    /// exceed `stock_ceiling`; otherwise `StockLimitExceeded` is returned and
    /// nothing changes. A merged line keeps its label and price snapshot and
    /// takes the newer `stock_ceiling`.
    pub fn add_or_merge(
        &mut self,
        product_id: ProductId,
        label: impl Into<String>,
        unit_price: Money,
        stock_ceiling: i64,
        quantity: i64,
    ) -> Result<LedgerChange, LedgerError> {
        if quantity < 1 {
            return Err(LedgerError::InvalidQuantity(quantity));
        }
        if unit_price.currency != self.currency {
            return Err(LedgerError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: unit_price.currency.code().to_string(),
            });
        }

        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id() == product_id) {
            let merged = existing.quantity_after(quantity).ok_or(LedgerError::Overflow)?;
            if merged > stock_ceiling {
                return Err(LedgerError::StockLimitExceeded {
                    product_id,
                    requested: merged,
                    available: stock_ceiling,
                });
            }
            let previous_ceiling = existing.stock_ceiling();
            existing.set_stock_ceiling(stock_ceiling);
            if let Err(e) = existing.set_quantity(merged) {
                existing.set_stock_ceiling(previous_ceiling);
                return Err(e);
            }
            return Ok(LedgerChange::Merged(product_id));
        }

        if quantity > stock_ceiling {
            return Err(LedgerError::StockLimitExceeded {
                product_id,
                requested: quantity,
                available: stock_ceiling,
            });
        }

        let item = LineItem::new(product_id, label.into(), unit_price, quantity, stock_ceiling)?;
        self.items.push(item);
        Ok(LedgerChange::Added(product_id))
    }

    /// Change a line's quantity by `delta`.
    ///
    /// Dropping below one removes the line. Going above the stock ceiling is
    /// rejected with the ledger unchanged.
    pub fn adjust_quantity(
        &mut self,
        product_id: ProductId,
        delta: i64,
    ) -> Result<Adjustment, LedgerError> {
        let index = self
            .items
            .iter()
            .position(|i| i.product_id() == product_id)
            .ok_or(LedgerError::NotFound(product_id))?;

        let item = &mut self.items[index];
        let new_quantity = item.quantity_after(delta).ok_or(LedgerError::Overflow)?;

        if new_quantity < 1 {
            self.items.remove(index);
            return Ok(Adjustment::Removed);
        }

        if new_quantity > item.stock_ceiling() {
            return Err(LedgerError::StockLimitExceeded {
                product_id,
                requested: new_quantity,
                available: item.stock_ceiling(),
            });
        }

        item.set_quantity(new_quantity)?;
        Ok(Adjustment::Updated(new_quantity))
    }

    /// Remove a product's line. Returns false if there was none.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| i.product_id() != product_id);
        self.items.len() < len_before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Compute subtotal, surcharge and grand total. Pure; nothing is cached.
    pub fn totals(&self, policy: &SurchargePolicy) -> Result<Totals, LedgerError> {
        let subtotals: Vec<Money> = self.items.iter().map(|i| i.subtotal()).collect();
        let subtotal =
            Money::try_sum(subtotals.iter(), self.currency).ok_or(LedgerError::Overflow)?;
        let surcharge = policy.surcharge(self.items.len(), &subtotal)?;
        let grand_total = subtotal.try_add(&surcharge).ok_or(LedgerError::Overflow)?;

        Ok(Totals {
            subtotal,
            surcharge,
            grand_total,
            kind: policy.kind(),
        })
    }

    /// Refresh stock ceilings from a newer catalog snapshot.
    ///
    /// Only lines whose product is still listed with enough stock for the
    /// current quantity are touched; shortfalls are left for
    /// [`crate::checkout::revalidate`] to report.
    pub fn refresh_ceilings(&mut self, catalog: &CatalogSnapshot) {
        for item in &mut self.items {
            if let Some(stock) = catalog.stock_of(item.product_id()) {
                if stock >= item.quantity() {
                    item.set_stock_ceiling(stock);
                }
            }
        }
    }

    /// Check every invariant. Used when a ledger comes from storage.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert(item.product_id()) {
                return Err(LedgerError::Validation(format!(
                    "duplicate line for product {}",
                    item.product_id()
                )));
            }
            if item.unit_price().currency != self.currency {
                return Err(LedgerError::CurrencyMismatch {
                    expected: self.currency.code().to_string(),
                    got: item.unit_price().currency.code().to_string(),
                });
            }
            item.check()?;
        }
        self.totals(&SurchargePolicy::None).map(|_| ())
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}
