//! Catalog snapshot types.
//!
//! The backend owns the catalog. The ledger only sees the entries from the
//! most recent successful load and never re-queries them mid-flow.

use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A medicine record as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicineRecord {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Decimal price; converted to minor units once, in [`CatalogEntry::from_record`].
    pub price: f64,
    pub stock: i64,
    #[serde(default)]
    pub low_stock_threshold: Option<i64>,
    #[serde(default)]
    pub manufacturer: Option<String>,
}

/// A catalog entry in ledger terms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: ProductId,
    pub name: String,
    pub category: Option<String>,
    pub price: Money,
    /// Units on hand when the snapshot was taken.
    pub stock: i64,
    pub low_stock_threshold: Option<i64>,
}

impl CatalogEntry {
    pub fn new(id: ProductId, name: impl Into<String>, price: Money, stock: i64) -> Self {
        Self {
            id,
            name: name.into(),
            category: None,
            price,
            stock,
            low_stock_threshold: None,
        }
    }

    /// Convert a backend record, rounding its price to the currency's minor unit.
    pub fn from_record(record: MedicineRecord, currency: Currency) -> Self {
        Self {
            id: record.id,
            name: record.name,
            category: record.category,
            price: Money::from_decimal(record.price, currency),
            stock: record.stock.max(0),
            low_stock_threshold: record.low_stock_threshold,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// At or below the low-stock threshold.
    pub fn is_low_stock(&self) -> bool {
        self.low_stock_threshold
            .map(|threshold| self.stock <= threshold)
            .unwrap_or(false)
    }

    /// Quantity picker rule: clamp a requested amount into `1..=stock`.
    ///
    /// Returns None when nothing is in stock.
    pub fn clamp_selection(&self, requested: i64) -> Option<i64> {
        if !self.in_stock() {
            return None;
        }
        Some(requested.clamp(1, self.stock))
    }
}

/// Catalog entries from one successful load, in backend order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    entries: Vec<CatalogEntry>,
    index: HashMap<ProductId, usize>,
}

impl CatalogSnapshot {
    /// Build a snapshot. A repeated id keeps its last entry.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut deduped: Vec<CatalogEntry> = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        for entry in entries {
            match index.get(&entry.id) {
                Some(&pos) => deduped[pos] = entry,
                None => {
                    index.insert(entry.id, deduped.len());
                    deduped.push(entry);
                }
            }
        }
        Self {
            entries: deduped,
            index,
        }
    }

    /// Build a snapshot from backend records.
    pub fn from_records(records: Vec<MedicineRecord>, currency: Currency) -> Self {
        Self::new(
            records
                .into_iter()
                .map(|r| CatalogEntry::from_record(r, currency))
                .collect(),
        )
    }

    pub fn get(&self, id: ProductId) -> Option<&CatalogEntry> {
        self.index.get(&id).and_then(|&pos| self.entries.get(pos))
    }

    pub fn stock_of(&self, id: ProductId) -> Option<i64> {
        self.get(id).map(|e| e.stock)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entries that can be sold right now.
    pub fn in_stock(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.in_stock())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
