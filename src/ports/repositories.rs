//! Repository traits. Lookups return `Ok(None)` when nothing matches.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Customer, Delivery, DomainError, Product, Transaction};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A conditional write matched no row: the record changed since it was read.
    #[error("Concurrent modification of {0}")]
    Conflict(String),

    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Stored record is invalid: {0}")]
    Corrupt(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("row".to_string()),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                RepositoryError::Duplicate(db_err.message().to_string())
            }
            other => RepositoryError::Database(other.to_string()),
        }
    }
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create(&self, customer: &Customer) -> RepositoryResult<Customer>;
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Customer>>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Customer>>;
    async fn update(&self, customer: &Customer) -> RepositoryResult<Customer>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: &Product) -> RepositoryResult<Product>;
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Product>>;
    async fn find_all(&self) -> RepositoryResult<Vec<Product>>;
    /// Active products with stock left, newest first.
    async fn find_all_available(&self) -> RepositoryResult<Vec<Product>>;
    async fn update(&self, product: &Product) -> RepositoryResult<Product>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Persists a new transaction and its delivery atomically.
    async fn create_with_delivery(
        &self,
        transaction: &Transaction,
        delivery: &Delivery,
    ) -> RepositoryResult<(Transaction, Delivery)>;
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Transaction>>;
    async fn find_by_transaction_no(&self, number: &str)
        -> RepositoryResult<Option<Transaction>>;
    async fn find_by_customer_id(&self, customer_id: Uuid) -> RepositoryResult<Vec<Transaction>>;
    /// PENDING transactions of a customer, most recent first.
    async fn find_pending_by_customer_id(
        &self,
        customer_id: Uuid,
    ) -> RepositoryResult<Vec<Transaction>>;
    async fn find_all(&self) -> RepositoryResult<Vec<Transaction>>;
    /// Writes only if the stored version equals `transaction.version()`.
    /// Returns the transaction with its bumped version, or
    /// [`RepositoryError::Conflict`] when the stored row moved on.
    async fn update(&self, transaction: &Transaction) -> RepositoryResult<Transaction>;
}

#[async_trait]
pub trait DeliveryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Delivery>>;
    async fn find_by_transaction_id(
        &self,
        transaction_id: Uuid,
    ) -> RepositoryResult<Option<Delivery>>;
    async fn update(&self, delivery: &Delivery) -> RepositoryResult<Delivery>;
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}
