//! Stock re-validation before submission.

use crate::catalog::CatalogSnapshot;
use crate::ids::ProductId;
use crate::ledger::Ledger;
use serde::{Deserialize, Serialize};

/// A line that the current stock can no longer cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockShortfall {
    pub product_id: ProductId,
    pub label: String,
    pub requested: i64,
    /// Zero when the product is no longer listed.
    pub available: i64,
}

/// Compare every line against a fresh catalog.
///
/// Returns the lines whose quantity exceeds current stock, in ledger order.
pub fn revalidate(ledger: &Ledger, fresh: &CatalogSnapshot) -> Vec<StockShortfall> {
    ledger
        .lines()
        .iter()
        .filter_map(|line| {
            let available = fresh.stock_of(line.product_id()).unwrap_or(0);
            (line.quantity() > available).then(|| StockShortfall {
                product_id: line.product_id(),
                label: line.label().to_string(),
                requested: line.quantity(),
                available,
            })
        })
        .collect()
}
