//! Settlement error types.

use thiserror::Error;

/// Settlement errors
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SettlementError {
    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Insufficient balance
    #[error("Insufficient balance for {account}: available {available}, required {required}")]
    InsufficientBalance {
        account: String,
        available: u64,
        required: u64,
    },

    /// Invalid amount (must be positive)
    #[error("Invalid amount: {0}")]
    InvalidAmount(u64),

    /// Backend could not be reached or rejected the request
    #[error("Settlement unavailable: {0}")]
    Unavailable(String),
}

impl SettlementError {
    /// Get a client-safe error message that doesn't leak account details
    pub fn client_message(&self) -> String {
        match self {
            SettlementError::AccountNotFound(_) => "Account not found".to_string(),
            SettlementError::InsufficientBalance { .. } => "Insufficient balance".to_string(),
            SettlementError::Unavailable(_) => "Settlement service unavailable".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for settlement operations
pub type SettlementResult<T> = Result<T, SettlementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_hides_accounts() {
        let err = SettlementError::InsufficientBalance {
            account: "0xdeadbeef".to_string(),
            available: 1,
            required: 5,
        };
        assert!(err.to_string().contains("0xdeadbeef"));
        assert!(!err.client_message().contains("0xdeadbeef"));

        let err = SettlementError::InvalidAmount(0);
        assert_eq!(err.client_message(), "Invalid amount: 0");
    }
}
