//! Failures reported by the checkout use cases.

use thiserror::Error;

use crate::domain::{DomainError, TransactionStatus};
use crate::ports::{GatewayError, RepositoryError};

#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("Transaction not found")]
    TransactionNotFound,

    #[error("Customer not found")]
    CustomerNotFound,

    #[error("Product not found")]
    ProductNotFound,

    #[error("Product not available")]
    ProductNotAvailable,

    #[error("Product is not active")]
    ProductInactive,

    #[error("Insufficient stock")]
    InsufficientStock,

    #[error("Delivery not found")]
    DeliveryNotFound,

    #[error("No pending transactions found for this email")]
    NoPendingTransaction,

    #[error("Transaction cannot be processed. Current status: {0}")]
    NotProcessable(TransactionStatus),

    #[error("Transaction cannot be processed. It was modified concurrently")]
    ConcurrentModification,

    /// Card tokenization rejected; carries the gateway's own message.
    #[error("{0}")]
    Tokenization(GatewayError),

    #[error("Payment processing failed: {0}")]
    PaymentFailed(GatewayError),

    /// The gateway settled the charge as ERROR, VOIDED or an unknown status.
    #[error("Payment error occurred")]
    PaymentError,

    #[error("{0}")]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl UseCaseError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            UseCaseError::TransactionNotFound
                | UseCaseError::CustomerNotFound
                | UseCaseError::ProductNotFound
                | UseCaseError::DeliveryNotFound
                | UseCaseError::NoPendingTransaction
        )
    }
}

pub type UseCaseResult<T> = Result<T, UseCaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_stable() {
        assert_eq!(
            UseCaseError::NotProcessable(TransactionStatus::Approved).to_string(),
            "Transaction cannot be processed. Current status: APPROVED"
        );
        assert_eq!(
            UseCaseError::PaymentFailed(GatewayError::PollingTimeoutExceeded).to_string(),
            "Payment processing failed: Polling timeout exceeded"
        );
        assert_eq!(
            UseCaseError::Tokenization(GatewayError::Rejected("Invalid card".into())).to_string(),
            "Invalid card"
        );
    }

    #[test]
    fn test_not_found_classification() {
        assert!(UseCaseError::NoPendingTransaction.is_not_found());
        assert!(UseCaseError::DeliveryNotFound.is_not_found());
        assert!(!UseCaseError::ProductNotAvailable.is_not_found());
        assert!(!UseCaseError::PaymentError.is_not_found());
    }
}
