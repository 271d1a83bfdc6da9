//! Catalog snapshot ownership and stale-response discard.

use crate::GatewayError;
use medcart_core::catalog::{CatalogSnapshot, MedicineRecord};
use medcart_core::Currency;

/// Handed out when a catalog load starts. Only the newest ticket may apply
/// its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogTicket {
    generation: u64,
}

impl CatalogTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a finished catalog load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogApply {
    /// The snapshot was replaced and now holds this many entries.
    Applied { entries: usize },
    /// A newer load was started, or the session was detached.
    Discarded,
}

/// The current snapshot plus the bookkeeping for in-flight loads.
#[derive(Debug)]
pub(crate) struct CatalogState {
    snapshot: CatalogSnapshot,
    currency: Currency,
    issued: u64,
    detached: bool,
}

impl CatalogState {
    pub(crate) fn new(currency: Currency) -> Self {
        Self {
            snapshot: CatalogSnapshot::default(),
            currency,
            issued: 0,
            detached: false,
        }
    }

    pub(crate) fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    pub(crate) fn is_detached(&self) -> bool {
        self.detached
    }

    pub(crate) fn begin(&mut self) -> CatalogTicket {
        self.issued += 1;
        CatalogTicket {
            generation: self.issued,
        }
    }

    pub(crate) fn finish(
        &mut self,
        ticket: CatalogTicket,
        result: Result<Vec<MedicineRecord>, GatewayError>,
    ) -> Result<CatalogApply, GatewayError> {
        if self.detached || ticket.generation != self.issued {
            tracing::warn!(
                generation = ticket.generation,
                newest = self.issued,
                detached = self.detached,
                "discarding stale catalog response"
            );
            return Ok(CatalogApply::Discarded);
        }

        let records = result?;
        self.snapshot = CatalogSnapshot::from_records(records, self.currency);
        tracing::debug!(entries = self.snapshot.len(), "catalog snapshot applied");
        Ok(CatalogApply::Applied {
            entries: self.snapshot.len(),
        })
    }

    /// Replace the snapshot with one fetched outside the ticket flow.
    /// Loads still in flight become stale.
    pub(crate) fn adopt(&mut self, snapshot: CatalogSnapshot) {
        self.issued += 1;
        if !self.detached {
            self.snapshot = snapshot;
        }
    }

    pub(crate) fn detach(&mut self) {
        self.detached = true;
    }
}
