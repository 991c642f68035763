//! Invariant violations raised by the domain entities.

use bigdecimal::BigDecimal;
use thiserror::Error;

use super::transaction::TransactionStatus;

/// Raised when constructing or mutating an entity would break one of its rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0}")]
    Invariant(&'static str),

    #[error("Total amount mismatch. Expected: {expected}, Got: {actual}")]
    TotalMismatch {
        expected: BigDecimal,
        actual: BigDecimal,
    },

    #[error("Quantity must be greater than 0")]
    InvalidQuantity,

    #[error("Insufficient stock. Available: {available}, Requested: {requested}")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("Cannot {action} transaction with status: {status}")]
    InvalidTransition {
        action: &'static str,
        status: TransactionStatus,
    },

    #[error("Unknown transaction status: {0}")]
    UnknownStatus(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

pub(crate) fn require_min_len(
    value: &str,
    min_len: usize,
    empty: &'static str,
    short: &'static str,
) -> DomainResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Invariant(empty));
    }
    if trimmed.chars().count() < min_len {
        return Err(DomainError::Invariant(short));
    }
    Ok(())
}

pub(crate) fn require_present(value: &str, message: &'static str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::Invariant(message));
    }
    Ok(())
}
