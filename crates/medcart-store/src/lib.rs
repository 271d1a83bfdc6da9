//! Key-value persistence for the MedCart cart ledger.
//!
//! A small byte store abstraction with an in-memory and an on-disk
//! implementation, a typed JSON [`Cache`] on top, and the
//! [`LedgerRepository`] that keeps the cart across restarts.
//!
//! # Example
//!
//! ```
//! use medcart_core::{Currency, Ledger};
//! use medcart_store::{LedgerRepository, MemoryStore};
//!
//! let repo = LedgerRepository::new(MemoryStore::new(), Currency::INR);
//! repo.save(&Ledger::new(Currency::INR)).unwrap();
//! assert!(repo.load().unwrap().is_empty());
//! ```

mod error;
mod kv;
mod repository;

pub use error::StoreError;
pub use kv::{Cache, FileStore, KeyValueStore, MemoryStore};
pub use repository::{LedgerEnvelope, LedgerRepository, DEFAULT_CART_KEY, ENVELOPE_VERSION};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, FileStore, KeyValueStore, LedgerRepository, MemoryStore, StoreError};
}
