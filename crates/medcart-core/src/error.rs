//! Ledger error types.

use crate::checkout::StockShortfall;
use crate::ids::ProductId;
use thiserror::Error;

/// Errors that can occur in ledger operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// The requested quantity is above the stock snapshot. Recoverable:
    /// the ledger is unchanged.
    #[error("Stock limit exceeded for product {product_id}: requested {requested}, available {available}")]
    StockLimitExceeded {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// No line for this product.
    #[error("Line item not found: {0}")]
    NotFound(ProductId),

    /// Product is not in the current catalog snapshot.
    #[error("Product not in catalog: {0}")]
    UnknownProduct(ProductId),

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Nothing to submit.
    #[error("Ledger is empty")]
    EmptyLedger,

    /// Stock moved since the lines were added.
    #[error("Stock changed for {} item(s)", .0.len())]
    StockChanged(Vec<StockShortfall>),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl LedgerError {
    /// Whether this is a user-facing warning rather than a failure.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            LedgerError::StockLimitExceeded { .. }
                | LedgerError::StockChanged(_)
                | LedgerError::EmptyLedger
        )
    }

    /// Short text for a notification.
    pub fn user_message(&self) -> String {
        match self {
            LedgerError::StockLimitExceeded { available, .. } if *available <= 0 => {
                "Out of stock".to_string()
            }
            LedgerError::StockLimitExceeded { available, .. } => {
                format!("Only {} units available", available)
            }
            LedgerError::StockChanged(shortfalls) => shortfalls
                .iter()
                .map(|s| format!("{}: only {} units available", s.label, s.available))
                .collect::<Vec<_>>()
                .join("; "),
            LedgerError::EmptyLedger => "Your cart is empty".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_warning_message() {
        let err = LedgerError::StockLimitExceeded {
            product_id: ProductId::new(1),
            requested: 6,
            available: 5,
        };
        assert!(err.is_warning());
        assert_eq!(err.user_message(), "Only 5 units available");
    }

    #[test]
    fn test_not_found_is_not_a_warning() {
        assert!(!LedgerError::NotFound(ProductId::new(3)).is_warning());
    }
}
