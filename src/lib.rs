pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod ports;
pub mod services;
pub mod startup;
pub mod use_cases;
pub mod utils;
pub mod validation;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;

use crate::adapters::{
    InMemoryRepositories, PostgresCustomerRepository, PostgresDeliveryRepository,
    PostgresProductRepository, PostgresTransactionRepository,
};
use crate::domain::FeeSchedule;
use crate::health::DependencyChecker;
use crate::middleware::request_logger::{request_logger_middleware, RequestLogging};
use crate::ports::{
    CustomerRepository, DeliveryRepository, PaymentGateway, ProductRepository,
    TransactionRepository,
};
use crate::services::PollingPolicy;
use crate::use_cases::{
    CreateTransaction, GetProduct, GetTransaction, ListProducts, ProcessPayment,
    RecoverTransaction,
};

/// The four repositories a checkout needs, behind their ports.
#[derive(Clone)]
pub struct Repositories {
    pub customers: Arc<dyn CustomerRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub deliveries: Arc<dyn DeliveryRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            customers: Arc::new(PostgresCustomerRepository::new(pool.clone())),
            products: Arc::new(PostgresProductRepository::new(pool.clone())),
            transactions: Arc::new(PostgresTransactionRepository::new(pool.clone())),
            deliveries: Arc::new(PostgresDeliveryRepository::new(pool)),
        }
    }
}

impl From<InMemoryRepositories> for Repositories {
    fn from(repos: InMemoryRepositories) -> Self {
        Self {
            customers: Arc::new(repos.customers),
            products: Arc::new(repos.products),
            transactions: Arc::new(repos.transactions),
            deliveries: Arc::new(repos.deliveries),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub repositories: Repositories,
    pub gateway: Arc<dyn PaymentGateway>,
    pub fees: FeeSchedule,
    pub polling: PollingPolicy,
    pub currency: String,
    pub health_checkers: Vec<Arc<dyn DependencyChecker>>,
    pub request_logging: RequestLogging,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        repositories: Repositories,
        gateway: Arc<dyn PaymentGateway>,
        fees: FeeSchedule,
        polling: PollingPolicy,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            repositories,
            gateway,
            fees,
            polling,
            currency: currency.into(),
            health_checkers: Vec::new(),
            request_logging: RequestLogging::default(),
            start_time: Instant::now(),
        }
    }

    pub fn with_health_checker(mut self, checker: Arc<dyn DependencyChecker>) -> Self {
        self.health_checkers.push(checker);
        self
    }

    pub fn with_request_logging(mut self, request_logging: RequestLogging) -> Self {
        self.request_logging = request_logging;
        self
    }

    pub fn create_transaction(&self) -> CreateTransaction {
        let repos = &self.repositories;
        CreateTransaction::new(
            repos.customers.clone(),
            repos.products.clone(),
            repos.transactions.clone(),
            self.fees.clone(),
        )
    }

    pub fn process_payment(&self) -> ProcessPayment {
        let repos = &self.repositories;
        ProcessPayment::new(
            repos.transactions.clone(),
            repos.products.clone(),
            repos.customers.clone(),
            self.gateway.clone(),
            self.polling,
            self.currency.clone(),
        )
    }

    pub fn get_transaction(&self) -> GetTransaction {
        let repos = &self.repositories;
        GetTransaction::new(
            repos.transactions.clone(),
            repos.customers.clone(),
            repos.products.clone(),
            repos.deliveries.clone(),
        )
    }

    pub fn recover_transaction(&self) -> RecoverTransaction {
        let repos = &self.repositories;
        RecoverTransaction::new(
            repos.transactions.clone(),
            repos.customers.clone(),
            repos.products.clone(),
            repos.deliveries.clone(),
        )
    }

    pub fn list_products(&self) -> ListProducts {
        ListProducts::new(self.repositories.products.clone())
    }

    pub fn get_product(&self) -> GetProduct {
        GetProduct::new(self.repositories.products.clone())
    }
}

pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .route("/transactions", post(handlers::transactions::create_transaction))
        .route(
            "/transactions/recover",
            get(handlers::transactions::recover_transaction),
        )
        .route("/transactions/:id", get(handlers::transactions::get_transaction))
        .route(
            "/transactions/:id/payment",
            patch(handlers::transactions::process_payment),
        )
        .route("/products", get(handlers::products::list_products))
        .route("/products/:id", get(handlers::products::get_product));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(axum::middleware::from_fn_with_state(
            state.request_logging,
            request_logger_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
