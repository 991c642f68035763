//! Recover transaction use case.
//! Finds the buyer's most recent PENDING transaction so an interrupted
//! checkout can resume.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::error::{UseCaseError, UseCaseResult};
use crate::domain::TransactionStatus;
use crate::ports::{
    CustomerRepository, DeliveryRepository, ProductRepository, TransactionRepository,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveredTransaction {
    pub transaction: RecoveredSummary,
    pub product: RecoveredProduct,
    pub delivery: RecoveredDelivery,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveredSummary {
    pub id: Uuid,
    pub transaction_no: String,
    pub status: TransactionStatus,
    pub total_amount: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveredProduct {
    pub name: String,
    pub price: BigDecimal,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveredDelivery {
    pub city: String,
    pub state: String,
    pub address: String,
}

pub struct RecoverTransaction {
    transactions: Arc<dyn TransactionRepository>,
    customers: Arc<dyn CustomerRepository>,
    products: Arc<dyn ProductRepository>,
    deliveries: Arc<dyn DeliveryRepository>,
}

impl RecoverTransaction {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        customers: Arc<dyn CustomerRepository>,
        products: Arc<dyn ProductRepository>,
        deliveries: Arc<dyn DeliveryRepository>,
    ) -> Self {
        Self {
            transactions,
            customers,
            products,
            deliveries,
        }
    }

    pub async fn execute(&self, email: &str) -> UseCaseResult<RecoveredTransaction> {
        let customer = self
            .customers
            .find_by_email(email)
            .await?
            .ok_or(UseCaseError::NoPendingTransaction)?;

        let transaction = self
            .transactions
            .find_pending_by_customer_id(customer.id())
            .await?
            .into_iter()
            .max_by_key(|t| t.created_at())
            .ok_or(UseCaseError::NoPendingTransaction)?;

        let product = self
            .products
            .find_by_id(transaction.product_id())
            .await?
            .ok_or(UseCaseError::ProductNotFound)?;

        let delivery = self
            .deliveries
            .find_by_transaction_id(transaction.id())
            .await?
            .ok_or(UseCaseError::DeliveryNotFound)?;

        Ok(RecoveredTransaction {
            transaction: RecoveredSummary {
                id: transaction.id(),
                transaction_no: transaction.transaction_no().to_string(),
                status: transaction.status(),
                total_amount: transaction.total_amount().clone(),
                created_at: transaction.created_at(),
            },
            product: RecoveredProduct {
                name: product.name().to_string(),
                price: product.price().clone(),
                image_url: product.image_url().map(str::to_string),
            },
            delivery: RecoveredDelivery {
                city: delivery.city().to_string(),
                state: delivery.state().to_string(),
                address: delivery.address().to_string(),
            },
        })
    }
}
