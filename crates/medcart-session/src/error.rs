//! Session error types.

use medcart_core::LedgerError;
use medcart_store::StoreError;
use thiserror::Error;

/// Errors from talking to the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The token was rejected.
    #[error("Unauthorized: please log in again")]
    Unauthorized,

    /// The backend answered with an error status.
    #[error("API error {status}: {detail}")]
    Api { status: u16, detail: String },

    /// The request never got an answer.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The answer could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Request timed out: {0}")]
    Timeout(String),
}

/// Anything a session operation can fail with.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl SessionError {
    /// Whether the error is a recoverable user-facing warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, SessionError::Ledger(e) if e.is_warning())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SessionError::Gateway(GatewayError::Unauthorized))
    }

    /// Short text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Ledger(e) => e.user_message(),
            SessionError::Gateway(GatewayError::Api { detail, .. }) => detail.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medcart_core::ProductId;

    #[test]
    fn test_stock_warning_is_warning() {
        let err = SessionError::from(LedgerError::StockLimitExceeded {
            product_id: ProductId::new(1),
            requested: 6,
            available: 5,
        });
        assert!(err.is_warning());
        assert_eq!(err.user_message(), "Only 5 units available");
    }

    #[test]
    fn test_api_detail_surfaces() {
        let err = SessionError::from(GatewayError::Api {
            status: 400,
            detail: "Insufficient stock for Paracetamol".to_string(),
        });
        assert!(!err.is_warning());
        assert_eq!(err.user_message(), "Insufficient stock for Paracetamol");
        assert!(SessionError::from(GatewayError::Unauthorized).is_unauthorized());
    }
}
