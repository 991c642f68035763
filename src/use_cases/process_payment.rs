//! Process payment use case.
//!
//! Settles a PENDING transaction against the payment gateway:
//! tokenize the card, create the charge, poll until it reaches a terminal
//! status, then persist the new transaction status and, on approval only,
//! take the sold unit out of stock.
//!
//! The status write always happens before the stock write. A stock failure
//! after a persisted approval does not undo the approval; it is logged with a
//! `reconciliation` marker for manual follow-up.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use serde::Serialize;
use uuid::Uuid;

use super::error::{UseCaseError, UseCaseResult};
use crate::domain::{to_minor_units, PaymentReceipt, Transaction, TransactionStatus};
use crate::ports::{
    CardData, ChargeRequest, CustomerRepository, GatewayStatus, PaymentGateway,
    ProductRepository, RepositoryError, TransactionRepository,
};
use crate::services::{poll_until_settled, PollingPolicy};

/// Units taken out of stock per approved settlement, whatever the ordered quantity.
pub const UNITS_PER_SETTLEMENT: i32 = 1;

#[derive(Debug, Clone)]
pub struct ProcessPaymentInput {
    pub transaction_id: Uuid,
    pub card: CardData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentOutput {
    pub transaction_id: Uuid,
    pub transaction_no: String,
    pub status: TransactionStatus,
    pub total_amount: BigDecimal,
    pub gateway_transaction_id: String,
    pub gateway_reference: String,
    pub card_brand: Option<String>,
    pub card_last_four: Option<String>,
    pub message: String,
}

pub struct ProcessPayment {
    transactions: Arc<dyn TransactionRepository>,
    products: Arc<dyn ProductRepository>,
    customers: Arc<dyn CustomerRepository>,
    gateway: Arc<dyn PaymentGateway>,
    polling: PollingPolicy,
    currency: String,
}

impl ProcessPayment {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        products: Arc<dyn ProductRepository>,
        customers: Arc<dyn CustomerRepository>,
        gateway: Arc<dyn PaymentGateway>,
        polling: PollingPolicy,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            transactions,
            products,
            customers,
            gateway,
            polling,
            currency: currency.into(),
        }
    }

    pub async fn execute(&self, input: ProcessPaymentInput) -> UseCaseResult<ProcessPaymentOutput> {
        let mut transaction = self
            .transactions
            .find_by_id(input.transaction_id)
            .await?
            .ok_or(UseCaseError::TransactionNotFound)?;

        if !transaction.can_be_processed() {
            return Err(UseCaseError::NotProcessable(transaction.status()));
        }

        let customer = self
            .customers
            .find_by_id(transaction.customer_id())
            .await?
            .ok_or(UseCaseError::CustomerNotFound)?;

        // From here on only the token is used, never the raw card.
        let card_token = self.gateway.tokenize_card(&input.card).await.map_err(|e| {
            tracing::warn!(transaction_id = %transaction.id(), error = %e, "Card tokenization failed");
            UseCaseError::Tokenization(e)
        })?;

        let charge = ChargeRequest {
            amount_in_cents: to_minor_units(transaction.total_amount())?,
            currency: self.currency.clone(),
            customer_email: customer.email().to_string(),
            reference: transaction.transaction_no().to_string(),
            token: card_token.token,
            installments: 1,
        };

        let created = match self.gateway.create_charge(&charge).await {
            Ok(created) => created,
            Err(e) => {
                tracing::error!(transaction_id = %transaction.id(), error = %e, "Charge creation failed");
                self.gateway.invalidate_acceptance_token().await;
                return Err(UseCaseError::PaymentFailed(e));
            }
        };

        let final_status = if created.status.is_pending() {
            poll_until_settled(self.gateway.as_ref(), &created.id, &self.polling)
                .await
                .map_err(|e| {
                    tracing::error!(transaction_id = %transaction.id(), error = %e, "Charge did not settle");
                    UseCaseError::PaymentFailed(e)
                })?
                .status
        } else {
            created.status
        };

        let gateway_transaction_id = created.id;
        let gateway_reference = created.reference;

        tracing::info!(
            transaction_id = %transaction.id(),
            gateway_transaction_id = %gateway_transaction_id,
            status = %final_status,
            "Charge settled"
        );

        match final_status {
            GatewayStatus::Approved => {
                transaction.approve(PaymentReceipt {
                    gateway_transaction_id,
                    gateway_reference,
                    card_brand: card_token.brand,
                    card_last_four: card_token.last_four,
                })?;
                let transaction = self.persist(&transaction).await?;
                self.take_settled_unit(&transaction).await;

                Ok(output(&transaction, "Payment processed successfully"))
            }
            GatewayStatus::Declined => {
                transaction.decline(Some(gateway_transaction_id), Some(gateway_reference))?;
                let transaction = self.persist(&transaction).await?;

                Ok(output(&transaction, "Payment declined by payment gateway"))
            }
            _ => {
                transaction.mark_as_error(Some(gateway_transaction_id), Some(gateway_reference))?;
                self.persist(&transaction).await?;

                Err(UseCaseError::PaymentError)
            }
        }
    }

    /// Writes the settled status. On failure the gateway has already settled the
    /// charge, so the outcome is logged for reconciliation.
    async fn persist(&self, transaction: &Transaction) -> UseCaseResult<Transaction> {
        self.transactions.update(transaction).await.map_err(|e| {
            tracing::error!(
                reconciliation = true,
                transaction_id = %transaction.id(),
                transaction_no = %transaction.transaction_no(),
                status = %transaction.status(),
                gateway_transaction_id = transaction.gateway_transaction_id().unwrap_or_default(),
                gateway_reference = transaction.gateway_reference().unwrap_or_default(),
                error = %e,
                "Settled charge not recorded on transaction"
            );
            match e {
                RepositoryError::Conflict(_) => UseCaseError::ConcurrentModification,
                other => UseCaseError::Repository(other),
            }
        })
    }

    /// Decrements stock after a persisted approval. Failures are logged, not returned.
    async fn take_settled_unit(&self, transaction: &Transaction) {
        let product_id = transaction.product_id();

        let mut product = match self.products.find_by_id(product_id).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                tracing::error!(
                    reconciliation = true,
                    transaction_id = %transaction.id(),
                    %product_id,
                    "Approved transaction references a missing product; stock not decremented"
                );
                return;
            }
            Err(e) => {
                tracing::error!(
                    reconciliation = true,
                    transaction_id = %transaction.id(),
                    %product_id,
                    error = %e,
                    "Could not load product after approval; stock not decremented"
                );
                return;
            }
        };

        if let Err(e) = product.decrease_stock(UNITS_PER_SETTLEMENT) {
            tracing::error!(
                reconciliation = true,
                transaction_id = %transaction.id(),
                %product_id,
                error = %e,
                "Stock could not be decremented after approval"
            );
            return;
        }

        if let Err(e) = self.products.update(&product).await {
            tracing::error!(
                reconciliation = true,
                transaction_id = %transaction.id(),
                %product_id,
                error = %e,
                "Stock update failed after approval"
            );
        }
    }
}

fn output(transaction: &Transaction, message: &str) -> ProcessPaymentOutput {
    ProcessPaymentOutput {
        transaction_id: transaction.id(),
        transaction_no: transaction.transaction_no().to_string(),
        status: transaction.status(),
        total_amount: transaction.total_amount().clone(),
        gateway_transaction_id: transaction
            .gateway_transaction_id()
            .unwrap_or_default()
            .to_string(),
        gateway_reference: transaction
            .gateway_reference()
            .unwrap_or_default()
            .to_string(),
        card_brand: transaction.card_brand().map(str::to_string),
        card_last_four: transaction.card_last_four().map(str::to_string),
        message: message.to_string(),
    }
}
