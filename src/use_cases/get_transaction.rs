//! Get transaction use case: full detail of one transaction.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::error::{UseCaseError, UseCaseResult};
use crate::domain::{Customer, Delivery, Product, Transaction, TransactionStatus};
use crate::ports::{
    CustomerRepository, DeliveryRepository, ProductRepository, TransactionRepository,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    pub transaction: TransactionSection,
    pub customer: CustomerSection,
    pub product: ProductSection,
    pub delivery: DeliverySection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentSection>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSection {
    pub id: Uuid,
    pub transaction_no: String,
    pub status: TransactionStatus,
    pub amount: BigDecimal,
    pub base_fee: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total_amount: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSection {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSection {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySection {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSection {
    pub card_brand: String,
    pub card_last_four: String,
    pub gateway_transaction_id: String,
    pub gateway_reference: String,
}

pub struct GetTransaction {
    transactions: Arc<dyn TransactionRepository>,
    customers: Arc<dyn CustomerRepository>,
    products: Arc<dyn ProductRepository>,
    deliveries: Arc<dyn DeliveryRepository>,
}

impl GetTransaction {
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

    pub async fn execute(&self, transaction_id: Uuid) -> UseCaseResult<TransactionDetail> {
        let transaction = self
            .transactions
            .find_by_id(transaction_id)
            .await?
            .ok_or(UseCaseError::TransactionNotFound)?;

        let customer = self
            .customers
            .find_by_id(transaction.customer_id())
            .await?
            .ok_or(UseCaseError::CustomerNotFound)?;

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

        Ok(TransactionDetail {
            payment: payment_section(&transaction),
            transaction: TransactionSection {
                id: transaction.id(),
                transaction_no: transaction.transaction_no().to_string(),
                status: transaction.status(),
                amount: transaction.amount().clone(),
                base_fee: transaction.base_fee().clone(),
                delivery_fee: transaction.delivery_fee().clone(),
                total_amount: transaction.total_amount().clone(),
                created_at: transaction.created_at(),
                updated_at: transaction.updated_at(),
            },
            customer: customer_section(&customer),
            product: product_section(&product),
            delivery: delivery_section(&delivery),
        })
    }
}

/// Present only once the gateway id, card brand and last four are all known.
fn payment_section(transaction: &Transaction) -> Option<PaymentSection> {
    let gateway_transaction_id = transaction.gateway_transaction_id()?;
    let card_brand = transaction.card_brand()?;
    let card_last_four = transaction.card_last_four()?;

    Some(PaymentSection {
        card_brand: card_brand.to_string(),
        card_last_four: card_last_four.to_string(),
        gateway_transaction_id: gateway_transaction_id.to_string(),
        gateway_reference: transaction
            .gateway_reference()
            .unwrap_or(transaction.transaction_no())
            .to_string(),
    })
}

fn customer_section(customer: &Customer) -> CustomerSection {
    CustomerSection {
        email: customer.email().to_string(),
        full_name: customer.full_name().to_string(),
        phone: customer.phone().map(str::to_string),
    }
}

fn product_section(product: &Product) -> ProductSection {
    ProductSection {
        id: product.id(),
        name: product.name().to_string(),
        description: product.description().map(str::to_string),
        price: product.price().clone(),
        image_url: product.image_url().map(str::to_string),
    }
}

fn delivery_section(delivery: &Delivery) -> DeliverySection {
    DeliverySection {
        full_name: delivery.full_name().to_string(),
        phone: delivery.phone().to_string(),
        address: delivery.address().to_string(),
        city: delivery.city().to_string(),
        state: delivery.state().to_string(),
        postal_code: delivery.postal_code().map(str::to_string),
    }
}
