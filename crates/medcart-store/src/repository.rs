//! Persisted cart ledger.

use crate::{Cache, KeyValueStore, StoreError};
use chrono::{DateTime, Utc};
use medcart_core::{Currency, Ledger};
use serde::{Deserialize, Serialize};

/// Key the cart is stored under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "cart";

/// Current envelope format.
pub const ENVELOPE_VERSION: u32 = 1;

/// What actually lands in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEnvelope {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub ledger: Ledger,
}

/// Loads and saves a single ledger under a well-known key.
///
/// Loading never fails because of bad data: anything that cannot be decoded,
/// has an unknown version, uses another currency or breaks a ledger
/// invariant is logged and replaced with an empty ledger.
#[derive(Debug)]
pub struct LedgerRepository<S> {
    cache: Cache<S>,
    key: String,
    currency: Currency,
}

impl<S: KeyValueStore> LedgerRepository<S> {
    pub fn new(store: S, currency: Currency) -> Self {
        Self::with_key(store, DEFAULT_CART_KEY, currency)
    }

    pub fn with_key(store: S, key: impl Into<String>, currency: Currency) -> Self {
        Self {
            cache: Cache::new(store),
            key: key.into(),
            currency,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Load the persisted ledger, or an empty one.
    ///
    /// Only backend failures (I/O, bad key) are returned as errors.
    pub fn load(&self) -> Result<Ledger, StoreError> {
        let envelope = match self.cache.get::<LedgerEnvelope>(&self.key) {
            Ok(Some(envelope)) => envelope,
            Ok(None) => {
                tracing::debug!(key = %self.key, "no persisted ledger");
                return Ok(Ledger::new(self.currency));
            }
            Err(StoreError::Serialization(e)) => {
                tracing::warn!(key = %self.key, error = %e, "discarding unreadable ledger");
                return Ok(Ledger::new(self.currency));
            }
            Err(e) => return Err(e),
        };

        if envelope.version != ENVELOPE_VERSION {
            tracing::warn!(
                key = %self.key,
                version = envelope.version,
                "discarding ledger with unsupported version"
            );
            return Ok(Ledger::new(self.currency));
        }

        let ledger = envelope.ledger;
        if ledger.currency() != self.currency {
            tracing::warn!(
                key = %self.key,
                stored = %ledger.currency(),
                expected = %self.currency,
                "discarding ledger in another currency"
            );
            return Ok(Ledger::new(self.currency));
        }
        if let Err(e) = ledger.validate() {
            tracing::warn!(key = %self.key, error = %e, "discarding invalid ledger");
            return Ok(Ledger::new(self.currency));
        }

        tracing::debug!(
            key = %self.key,
            lines = ledger.len(),
            saved_at = %envelope.saved_at,
            "loaded ledger"
        );
        Ok(ledger)
    }

    /// Persist `ledger`, replacing whatever was stored.
    pub fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let envelope = LedgerEnvelope {
            version: ENVELOPE_VERSION,
            saved_at: Utc::now(),
            ledger: ledger.clone(),
        };
        self.cache.set(&self.key, &envelope)?;
        tracing::debug!(key = %self.key, lines = ledger.len(), "saved ledger");
        Ok(())
    }

    /// Remove the persisted ledger entirely.
    pub fn discard(&self) -> Result<(), StoreError> {
        self.cache.delete(&self.key)
    }

    pub fn store(&self) -> &S {
        self.cache.store()
    }
}
