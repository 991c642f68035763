//! Port implementations: Postgres for production, in-memory for tests and demos.

pub mod in_memory;
pub mod postgres_customer_repository;
pub mod postgres_delivery_repository;
pub mod postgres_product_repository;
pub mod postgres_transaction_repository;

pub use in_memory::{
    InMemoryCustomerRepository, InMemoryDeliveryRepository, InMemoryProductRepository,
    InMemoryRepositories, InMemoryTransactionRepository,
};
pub use postgres_customer_repository::PostgresCustomerRepository;
pub use postgres_delivery_repository::PostgresDeliveryRepository;
pub use postgres_product_repository::PostgresProductRepository;
pub use postgres_transaction_repository::PostgresTransactionRepository;
