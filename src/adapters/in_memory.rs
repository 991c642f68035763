//! In-memory repositories for tests and `serve --in-memory`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Customer, Delivery, Product, Transaction, TransactionStatus};
use crate::ports::{
    CustomerRepository, DeliveryRepository, ProductRepository, RepositoryError,
    RepositoryResult, TransactionRepository,
};

/// Thread-safe customer store keyed by id.
#[derive(Default, Clone)]
pub struct InMemoryCustomerRepository {
    customers: Arc<RwLock<HashMap<Uuid, Customer>>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn create(&self, customer: &Customer) -> RepositoryResult<Customer> {
        let mut customers = self.customers.write().await;
        if customers.values().any(|c| c.email() == customer.email()) {
            return Err(RepositoryError::Duplicate(format!(
                "customer email {}",
                customer.email()
            )));
        }
        customers.insert(customer.id(), customer.clone());
        Ok(customer.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Customer>> {
        let customers = self.customers.read().await;
        Ok(customers.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Customer>> {
        let customers = self.customers.read().await;
        Ok(customers.values().find(|c| c.email() == email).cloned())
    }

    async fn update(&self, customer: &Customer) -> RepositoryResult<Customer> {
        let mut customers = self.customers.write().await;
        match customers.get_mut(&customer.id()) {
            Some(stored) => {
                *stored = customer.clone();
                Ok(customer.clone())
            }
            None => Err(RepositoryError::NotFound(format!("customer {}", customer.id()))),
        }
    }
}

/// Thread-safe product store keyed by id.
#[derive(Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T, F>(mut items: Vec<T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    items
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: &Product) -> RepositoryResult<Product> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.id()) {
            return Err(RepositoryError::Duplicate(format!("product {}", product.id())));
        }
        products.insert(product.id(), product.clone());
        Ok(product.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(newest_first(
            products.values().cloned().collect(),
            Product::created_at,
        ))
    }

    async fn find_all_available(&self) -> RepositoryResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(newest_first(
            products.values().filter(|p| p.is_available()).cloned().collect(),
            Product::created_at,
        ))
    }

    async fn update(&self, product: &Product) -> RepositoryResult<Product> {
        let mut products = self.products.write().await;
        match products.get_mut(&product.id()) {
            Some(stored) => {
                *stored = product.clone();
                Ok(product.clone())
            }
            None => Err(RepositoryError::NotFound(format!("product {}", product.id()))),
        }
    }
}

/// Transactions and their deliveries live behind one lock so that
/// `create_with_delivery` is a single unit of work.
#[derive(Default)]
struct OrderBook {
    transactions: HashMap<Uuid, Transaction>,
    deliveries: HashMap<Uuid, Delivery>,
}

#[derive(Default, Clone)]
pub struct InMemoryTransactionRepository {
    book: Arc<RwLock<OrderBook>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A delivery repository reading and writing this repository's deliveries.
    pub fn deliveries(&self) -> InMemoryDeliveryRepository {
        InMemoryDeliveryRepository {
            book: Arc::clone(&self.book),
        }
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn create_with_delivery(
        &self,
        transaction: &Transaction,
        delivery: &Delivery,
    ) -> RepositoryResult<(Transaction, Delivery)> {
        let mut book = self.book.write().await;

        if book.transactions.contains_key(&transaction.id())
            || book
                .transactions
                .values()
                .any(|t| t.transaction_no() == transaction.transaction_no())
        {
            return Err(RepositoryError::Duplicate(format!(
                "transaction {}",
                transaction.transaction_no()
            )));
        }
        if delivery.transaction_id() != transaction.id()
            || book
                .deliveries
                .values()
                .any(|d| d.transaction_id() == transaction.id())
        {
            return Err(RepositoryError::Duplicate(format!(
                "delivery for transaction {}",
                transaction.id()
            )));
        }

        book.transactions.insert(transaction.id(), transaction.clone());
        book.deliveries.insert(delivery.id(), delivery.clone());
        Ok((transaction.clone(), delivery.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Transaction>> {
        let book = self.book.read().await;
        Ok(book.transactions.get(&id).cloned())
    }

    async fn find_by_transaction_no(
        &self,
        number: &str,
    ) -> RepositoryResult<Option<Transaction>> {
        let book = self.book.read().await;
        Ok(book
            .transactions
            .values()
            .find(|t| t.transaction_no() == number)
            .cloned())
    }

    async fn find_by_customer_id(&self, customer_id: Uuid) -> RepositoryResult<Vec<Transaction>> {
        let book = self.book.read().await;
        Ok(newest_first(
            book.transactions
                .values()
                .filter(|t| t.customer_id() == customer_id)
                .cloned()
                .collect(),
            Transaction::created_at,
        ))
    }

    async fn find_pending_by_customer_id(
        &self,
        customer_id: Uuid,
    ) -> RepositoryResult<Vec<Transaction>> {
        let book = self.book.read().await;
        Ok(newest_first(
            book.transactions
                .values()
                .filter(|t| {
                    t.customer_id() == customer_id && t.status() == TransactionStatus::Pending
                })
                .cloned()
                .collect(),
            Transaction::created_at,
        ))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Transaction>> {
        let book = self.book.read().await;
        Ok(newest_first(
            book.transactions.values().cloned().collect(),
            Transaction::created_at,
        ))
    }

    async fn update(&self, transaction: &Transaction) -> RepositoryResult<Transaction> {
        let mut book = self.book.write().await;
        let stored = book
            .transactions
            .get_mut(&transaction.id())
            .ok_or_else(|| RepositoryError::NotFound(format!("transaction {}", transaction.id())))?;

        if stored.version() != transaction.version() {
            return Err(RepositoryError::Conflict(format!(
                "transaction {}",
                transaction.id()
            )));
        }

        let mut updated = transaction.clone();
        updated.set_version(transaction.version() + 1);
        *stored = updated.clone();
        Ok(updated)
    }
}

/// Shares its storage with the [`InMemoryTransactionRepository`] it came from.
#[derive(Clone)]
pub struct InMemoryDeliveryRepository {
    book: Arc<RwLock<OrderBook>>,
}

#[async_trait]
impl DeliveryRepository for InMemoryDeliveryRepository {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Delivery>> {
        let book = self.book.read().await;
        Ok(book.deliveries.get(&id).cloned())
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: Uuid,
    ) -> RepositoryResult<Option<Delivery>> {
        let book = self.book.read().await;
        Ok(book
            .deliveries
            .values()
            .find(|d| d.transaction_id() == transaction_id)
            .cloned())
    }

    async fn update(&self, delivery: &Delivery) -> RepositoryResult<Delivery> {
        let mut book = self.book.write().await;
        match book.deliveries.get_mut(&delivery.id()) {
            Some(stored) => {
                *stored = delivery.clone();
                Ok(delivery.clone())
            }
            None => Err(RepositoryError::NotFound(format!("delivery {}", delivery.id()))),
        }
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let mut book = self.book.write().await;
        book.deliveries
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("delivery {}", id)))
    }
}

/// One set of in-memory repositories sharing consistent storage.
#[derive(Clone)]
pub struct InMemoryRepositories {
    pub customers: InMemoryCustomerRepository,
    pub products: InMemoryProductRepository,
    pub transactions: InMemoryTransactionRepository,
    pub deliveries: InMemoryDeliveryRepository,
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        let transactions = InMemoryTransactionRepository::new();
        Self {
            customers: InMemoryCustomerRepository::new(),
            products: InMemoryProductRepository::new(),
            deliveries: transactions.deliveries(),
            transactions,
        }
    }
}

impl Default for InMemoryRepositories {
    fn default() -> Self {
        Self::new()
    }
}
