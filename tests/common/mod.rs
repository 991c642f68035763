#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use checkout_core::adapters::InMemoryRepositories;
use checkout_core::domain::{
    Customer, Delivery, DeliveryDetails, FeeSchedule, Product, Transaction,
};
use checkout_core::ports::{
    CardData, CardToken, ChargeRequest, CustomerRepository, GatewayError, GatewayResult,
    GatewayStatus, GatewayTransaction, PaymentGateway, ProductRepository, RepositoryError,
    RepositoryResult, TransactionRepository,
};
use checkout_core::services::PollingPolicy;
use checkout_core::use_cases::{
    CreateTransaction, CreateTransactionInput, CreateTransactionOutput, ProcessPayment,
    ProcessPaymentInput,
};
use checkout_core::{AppState, Repositories};

pub const GATEWAY_TX_ID: &str = "15113-1700000000-48271";

/// A payment gateway answering from a script and counting every call.
pub struct FakeGateway {
    tokenize: Mutex<GatewayResult<CardToken>>,
    charge: Mutex<GatewayResult<GatewayTransaction>>,
    polls: Mutex<VecDeque<GatewayStatus>>,
    pub tokenize_calls: AtomicUsize,
    pub charge_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub invalidations: AtomicUsize,
    pub last_charge: Mutex<Option<ChargeRequest>>,
}

impl FakeGateway {
    fn scripted(charge: GatewayResult<GatewayTransaction>, polls: Vec<GatewayStatus>) -> Self {
        Self {
            tokenize: Mutex::new(Ok(CardToken {
                token: "tok_test_4242".to_string(),
                brand: Some("VISA".to_string()),
                last_four: Some("4242".to_string()),
            })),
            charge: Mutex::new(charge),
            polls: Mutex::new(polls.into()),
            tokenize_calls: AtomicUsize::new(0),
            charge_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
            last_charge: Mutex::new(None),
        }
    }

    /// The charge is created already settled with `status`.
    pub fn settling(status: GatewayStatus) -> Self {
        Self::scripted(Ok(gateway_transaction(status)), Vec::new())
    }

    /// The charge is created PENDING; each poll returns the next status, then
    /// PENDING forever.
    pub fn pending_then(polls: Vec<GatewayStatus>) -> Self {
        Self::scripted(Ok(gateway_transaction(GatewayStatus::Pending)), polls)
    }

    pub fn rejecting_card(message: &str) -> Self {
        let gateway = Self::settling(GatewayStatus::Approved);
        *gateway.tokenize.lock().unwrap() = Err(GatewayError::Rejected(message.to_string()));
        gateway
    }

    pub fn failing_charge(error: GatewayError) -> Self {
        Self::scripted(Err(error), Vec::new())
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn gateway_transaction(status: GatewayStatus) -> GatewayTransaction {
    GatewayTransaction {
        id: GATEWAY_TX_ID.to_string(),
        status,
        reference: "gw-ref-001".to_string(),
        status_message: None,
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn tokenize_card(&self, _card: &CardData) -> GatewayResult<CardToken> {
        self.tokenize_calls.fetch_add(1, Ordering::SeqCst);
        self.tokenize.lock().unwrap().clone()
    }

    async fn create_charge(&self, request: &ChargeRequest) -> GatewayResult<GatewayTransaction> {
        self.charge_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_charge.lock().unwrap() = Some(request.clone());
        self.charge.lock().unwrap().clone()
    }

    async fn get_transaction_status(&self, id: &str) -> GatewayResult<GatewayTransaction> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let status = self
            .polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(GatewayStatus::Pending);
        Ok(GatewayTransaction {
            id: id.to_string(),
            ..gateway_transaction(status)
        })
    }

    async fn invalidate_acceptance_token(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct CountingCustomers {
    inner: Arc<dyn CustomerRepository>,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
}

#[async_trait]
impl CustomerRepository for CountingCustomers {
    async fn create(&self, customer: &Customer) -> RepositoryResult<Customer> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(customer).await
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Customer>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Customer>> {
        self.inner.find_by_email(email).await
    }

    async fn update(&self, customer: &Customer) -> RepositoryResult<Customer> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update(customer).await
    }
}

pub struct CountingProducts {
    inner: Arc<dyn ProductRepository>,
    pub updates: AtomicUsize,
    pub fail_updates: AtomicBool,
}

#[async_trait]
impl ProductRepository for CountingProducts {
    async fn create(&self, product: &Product) -> RepositoryResult<Product> {
        self.inner.create(product).await
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Product>> {
        self.inner.find_by_id(id).await
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Product>> {
        self.inner.find_all().await
    }

    async fn find_all_available(&self) -> RepositoryResult<Vec<Product>> {
        self.inner.find_all_available().await
    }

    async fn update(&self, product: &Product) -> RepositoryResult<Product> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database("connection reset".to_string()));
        }
        self.inner.update(product).await
    }
}

pub struct CountingTransactions {
    inner: Arc<dyn TransactionRepository>,
    pub updates: AtomicUsize,
    /// Every update reports a concurrent writer.
    pub conflict_on_update: AtomicBool,
    /// Every update fails with a database error.
    pub fail_updates: AtomicBool,
}

#[async_trait]
impl TransactionRepository for CountingTransactions {
    async fn create_with_delivery(
        &self,
        transaction: &Transaction,
        delivery: &Delivery,
    ) -> RepositoryResult<(Transaction, Delivery)> {
        self.inner.create_with_delivery(transaction, delivery).await
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Transaction>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_transaction_no(
        &self,
        number: &str,
    ) -> RepositoryResult<Option<Transaction>> {
        self.inner.find_by_transaction_no(number).await
    }

    async fn find_by_customer_id(&self, customer_id: Uuid) -> RepositoryResult<Vec<Transaction>> {
        self.inner.find_by_customer_id(customer_id).await
    }

    async fn find_pending_by_customer_id(
        &self,
        customer_id: Uuid,
    ) -> RepositoryResult<Vec<Transaction>> {
        self.inner.find_pending_by_customer_id(customer_id).await
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Transaction>> {
        self.inner.find_all().await
    }

    async fn update(&self, transaction: &Transaction) -> RepositoryResult<Transaction> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.conflict_on_update.load(Ordering::SeqCst) {
            return Err(RepositoryError::Conflict(format!(
                "transaction {}",
                transaction.id()
            )));
        }
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database("connection reset".to_string()));
        }
        self.inner.update(transaction).await
    }
}

/// In-memory repositories behind counting wrappers, plus a scripted gateway.
pub struct TestContext {
    pub customers: Arc<CountingCustomers>,
    pub products: Arc<CountingProducts>,
    pub transactions: Arc<CountingTransactions>,
    pub repos: InMemoryRepositories,
    pub gateway: Arc<FakeGateway>,
    pub fees: FeeSchedule,
    pub polling: PollingPolicy,
}

impl TestContext {
    pub fn new(gateway: FakeGateway) -> Self {
        let repos = InMemoryRepositories::new();
        Self {
            customers: Arc::new(CountingCustomers {
                inner: Arc::new(repos.customers.clone()),
                creates: AtomicUsize::new(0),
                updates: AtomicUsize::new(0),
            }),
            products: Arc::new(CountingProducts {
                inner: Arc::new(repos.products.clone()),
                updates: AtomicUsize::new(0),
                fail_updates: AtomicBool::new(false),
            }),
            transactions: Arc::new(CountingTransactions {
                inner: Arc::new(repos.transactions.clone()),
                updates: AtomicUsize::new(0),
                conflict_on_update: AtomicBool::new(false),
                fail_updates: AtomicBool::new(false),
            }),
            repos,
            gateway: Arc::new(gateway),
            fees: fees(5000, 10000),
            polling: PollingPolicy::new(Duration::from_millis(1), Duration::from_millis(20)),
        }
    }

    pub fn with_polling(mut self, polling: PollingPolicy) -> Self {
        self.polling = polling;
        self
    }

    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    pub async fn add_product(&self, price: i64, stock: i32) -> Product {
        let product = Product::new(
            "Wireless Headphones",
            Some("Over-ear, noise cancelling".to_string()),
            BigDecimal::from(price),
            stock,
            Some("https://images.example.com/headphones.jpg".to_string()),
        )
        .unwrap();
        self.repos.products.create(&product).await.unwrap()
    }

    pub async fn product(&self, id: Uuid) -> Product {
        self.repos.products.find_by_id(id).await.unwrap().unwrap()
    }

    pub async fn transaction(&self, id: Uuid) -> Transaction {
        self.repos.transactions.find_by_id(id).await.unwrap().unwrap()
    }

    pub fn create_transaction(&self) -> CreateTransaction {
        CreateTransaction::new(
            self.customers.clone(),
            self.products.clone(),
            self.transactions.clone(),
            self.fees.clone(),
        )
    }

    pub fn process_payment(&self) -> ProcessPayment {
        ProcessPayment::new(
            self.transactions.clone(),
            self.products.clone(),
            self.customers.clone(),
            self.gateway.clone(),
            self.polling,
            "COP",
        )
    }

    pub async fn pending_order(&self, product: &Product, quantity: i32) -> CreateTransactionOutput {
        self.create_transaction()
            .execute(order("buyer@example.com", product.id(), quantity))
            .await
            .unwrap()
    }

    pub async fn pay(
        &self,
        transaction_id: Uuid,
    ) -> checkout_core::use_cases::UseCaseResult<checkout_core::use_cases::ProcessPaymentOutput>
    {
        self.process_payment()
            .execute(ProcessPaymentInput {
                transaction_id,
                card: card(),
            })
            .await
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            customers: self.customers.clone(),
            products: self.products.clone(),
            transactions: self.transactions.clone(),
            deliveries: Arc::new(self.repos.deliveries.clone()),
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(
            self.repositories(),
            self.gateway.clone(),
            self.fees.clone(),
            self.polling,
            "COP",
        )
    }
}

pub fn fees(base_fee: i64, delivery_fee: i64) -> FeeSchedule {
    FeeSchedule::new(BigDecimal::from(base_fee), BigDecimal::from(delivery_fee)).unwrap()
}

pub fn delivery() -> DeliveryDetails {
    DeliveryDetails {
        full_name: "Ana Gomez".to_string(),
        phone: "3001234567".to_string(),
        address: "Calle 123 #45-67".to_string(),
        city: "Bogota".to_string(),
        state: "Cundinamarca".to_string(),
        postal_code: Some("110111".to_string()),
    }
}

pub fn order(email: &str, product_id: Uuid, quantity: i32) -> CreateTransactionInput {
    CreateTransactionInput {
        customer_email: email.to_string(),
        customer_full_name: "Ana Gomez".to_string(),
        customer_phone: Some("3001234567".to_string()),
        product_id,
        quantity,
        delivery: delivery(),
    }
}

pub fn card() -> CardData {
    CardData {
        number: "4242 4242 4242 4242".to_string(),
        exp_month: "8".to_string(),
        exp_year: "28".to_string(),
        cvc: "123".to_string(),
        card_holder: "Ana Gomez".to_string(),
    }
}
