//! Create transaction use case.
//! Registers (or refreshes) the buyer, checks the product and persists a
//! PENDING transaction together with its delivery.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use serde::Serialize;
use uuid::Uuid;

use super::error::{UseCaseError, UseCaseResult};
use crate::domain::{
    Customer, Delivery, DeliveryDetails, FeeSchedule, Transaction, TransactionStatus,
};
use crate::ports::{CustomerRepository, ProductRepository, TransactionRepository};

#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub customer_email: String,
    pub customer_full_name: String,
    pub customer_phone: Option<String>,
    pub product_id: Uuid,
    pub quantity: i32,
    pub delivery: DeliveryDetails,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionOutput {
    pub transaction_id: Uuid,
    pub transaction_no: String,
    pub status: TransactionStatus,
    pub total_amount: BigDecimal,
}

pub struct CreateTransaction {
    customers: Arc<dyn CustomerRepository>,
    products: Arc<dyn ProductRepository>,
    transactions: Arc<dyn TransactionRepository>,
    fees: FeeSchedule,
}

impl CreateTransaction {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        products: Arc<dyn ProductRepository>,
        transactions: Arc<dyn TransactionRepository>,
        fees: FeeSchedule,
    ) -> Self {
        Self {
            customers,
            products,
            transactions,
            fees,
        }
    }

    pub async fn execute(
        &self,
        input: CreateTransactionInput,
    ) -> UseCaseResult<CreateTransactionOutput> {
        let customer = self
            .find_or_create_customer(
                &input.customer_email,
                &input.customer_full_name,
                input.customer_phone,
            )
            .await?;

        let product = self
            .products
            .find_by_id(input.product_id)
            .await?
            .ok_or(UseCaseError::ProductNotFound)?;

        if !product.is_active() {
            return Err(UseCaseError::ProductNotAvailable);
        }
        if !product.has_stock(input.quantity) {
            return Err(UseCaseError::InsufficientStock);
        }

        let totals = self.fees.quote(product.price(), input.quantity)?;
        let transaction = Transaction::new(
            Transaction::generate_number(),
            product.id(),
            customer.id(),
            totals,
        )?;
        let delivery = Delivery::new(transaction.id(), input.delivery)?;

        let (transaction, _) = self
            .transactions
            .create_with_delivery(&transaction, &delivery)
            .await?;

        tracing::info!(
            transaction_id = %transaction.id(),
            transaction_no = transaction.transaction_no(),
            total_amount = %transaction.total_amount(),
            "Transaction created"
        );

        Ok(CreateTransactionOutput {
            transaction_id: transaction.id(),
            transaction_no: transaction.transaction_no().to_string(),
            status: transaction.status(),
            total_amount: transaction.total_amount().clone(),
        })
    }

    /// Looks the buyer up by email. Creates them on first order and writes an
    /// update only when the name or a supplied phone changed.
    async fn find_or_create_customer(
        &self,
        email: &str,
        full_name: &str,
        phone: Option<String>,
    ) -> UseCaseResult<Customer> {
        match self.customers.find_by_email(email).await? {
            Some(mut customer) => {
                if customer.differs_from(full_name, phone.as_deref()) {
                    customer.update_info(full_name, phone)?;
                    let customer = self.customers.update(&customer).await?;
                    tracing::debug!(customer_id = %customer.id(), "Customer updated");
                    return Ok(customer);
                }
                Ok(customer)
            }
            None => {
                let customer = Customer::new(email, full_name, phone)?;
                let customer = self.customers.create(&customer).await?;
                tracing::debug!(customer_id = %customer.id(), "Customer created");
                Ok(customer)
            }
        }
    }
}
