//! Transaction domain entity.
//! An order for a single product and the state machine that settles it.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{require_present, DomainError, DomainResult};
use super::money::OrderTotals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Declined,
    Error,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Approved => "APPROVED",
            TransactionStatus::Declined => "DECLINED",
            TransactionStatus::Error => "ERROR",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TransactionStatus::Pending),
            "APPROVED" => Ok(TransactionStatus::Approved),
            "DECLINED" => Ok(TransactionStatus::Declined),
            "ERROR" => Ok(TransactionStatus::Error),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// Gateway data recorded when a charge is approved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaymentReceipt {
    pub gateway_transaction_id: String,
    pub gateway_reference: String,
    pub card_brand: Option<String>,
    pub card_last_four: Option<String>,
}

/// Persisted shape of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub transaction_no: String,
    pub product_id: Uuid,
    pub customer_id: Uuid,
    pub status: TransactionStatus,
    pub amount: BigDecimal,
    pub base_fee: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total_amount: BigDecimal,
    pub gateway_transaction_id: Option<String>,
    pub gateway_reference: Option<String>,
    pub card_brand: Option<String>,
    pub card_last_four: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: Uuid,
    transaction_no: String,
    product_id: Uuid,
    customer_id: Uuid,
    status: TransactionStatus,
    amount: BigDecimal,
    base_fee: BigDecimal,
    delivery_fee: BigDecimal,
    total_amount: BigDecimal,
    gateway_transaction_id: Option<String>,
    gateway_reference: Option<String>,
    card_brand: Option<String>,
    card_last_four: Option<String>,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Transaction {
    /// A fresh PENDING transaction at version 0.
    pub fn new(
        transaction_no: String,
        product_id: Uuid,
        customer_id: Uuid,
        totals: OrderTotals,
    ) -> DomainResult<Self> {
        let now = Utc::now();
        Self::restore(TransactionRecord {
            id: Uuid::new_v4(),
            transaction_no,
            product_id,
            customer_id,
            status: TransactionStatus::Pending,
            amount: totals.amount,
            base_fee: totals.base_fee,
            delivery_fee: totals.delivery_fee,
            total_amount: totals.total_amount,
            gateway_transaction_id: None,
            gateway_reference: None,
            card_brand: None,
            card_last_four: None,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn restore(record: TransactionRecord) -> DomainResult<Self> {
        require_present(&record.transaction_no, "Transaction number is required")?;

        let zero = BigDecimal::from(0);
        if record.amount < zero {
            return Err(DomainError::Invariant("Transaction amount cannot be negative"));
        }
        if record.base_fee < zero {
            return Err(DomainError::Invariant("Base fee cannot be negative"));
        }
        if record.delivery_fee < zero {
            return Err(DomainError::Invariant("Delivery fee cannot be negative"));
        }
        if record.total_amount < zero {
            return Err(DomainError::Invariant("Total amount cannot be negative"));
        }

        let expected = &record.amount + &record.base_fee + &record.delivery_fee;
        let tolerance = BigDecimal::from(1) / BigDecimal::from(100);
        if (&expected - &record.total_amount).abs() > tolerance {
            return Err(DomainError::TotalMismatch {
                expected,
                actual: record.total_amount,
            });
        }

        Ok(Self {
            id: record.id,
            transaction_no: record.transaction_no,
            product_id: record.product_id,
            customer_id: record.customer_id,
            status: record.status,
            amount: record.amount,
            base_fee: record.base_fee,
            delivery_fee: record.delivery_fee,
            total_amount: record.total_amount,
            gateway_transaction_id: record.gateway_transaction_id,
            gateway_reference: record.gateway_reference,
            card_brand: record.card_brand,
            card_last_four: record.card_last_four,
            version: record.version,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// `TXN-<yyyymmdd>-<epoch millis>-<suffix>`
    pub fn generate_number() -> String {
        let now = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
        format!(
            "TXN-{}-{}-{}",
            now.format("%Y%m%d"),
            now.timestamp_millis(),
            suffix
        )
    }

    pub fn approve(&mut self, receipt: PaymentReceipt) -> DomainResult<()> {
        self.ensure_pending("approve")?;

        self.status = TransactionStatus::Approved;
        self.gateway_transaction_id = Some(receipt.gateway_transaction_id);
        self.gateway_reference = Some(receipt.gateway_reference);
        self.card_brand = receipt.card_brand;
        self.card_last_four = receipt.card_last_four;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn decline(
        &mut self,
        gateway_transaction_id: Option<String>,
        gateway_reference: Option<String>,
    ) -> DomainResult<()> {
        self.ensure_pending("decline")?;
        self.settle(TransactionStatus::Declined, gateway_transaction_id, gateway_reference);
        Ok(())
    }

    pub fn mark_as_error(
        &mut self,
        gateway_transaction_id: Option<String>,
        gateway_reference: Option<String>,
    ) -> DomainResult<()> {
        self.ensure_pending("mark as error")?;
        self.settle(TransactionStatus::Error, gateway_transaction_id, gateway_reference);
        Ok(())
    }

    fn ensure_pending(&self, action: &'static str) -> DomainResult<()> {
        if !self.can_be_processed() {
            return Err(DomainError::InvalidTransition {
                action,
                status: self.status,
            });
        }
        Ok(())
    }

    fn settle(
        &mut self,
        status: TransactionStatus,
        gateway_transaction_id: Option<String>,
        gateway_reference: Option<String>,
    ) {
        self.status = status;
        if gateway_transaction_id.is_some() {
            self.gateway_transaction_id = gateway_transaction_id;
        }
        if gateway_reference.is_some() {
            self.gateway_reference = gateway_reference;
        }
        self.updated_at = Utc::now();
    }

    pub fn can_be_processed(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    pub fn is_successful(&self) -> bool {
        self.status == TransactionStatus::Approved
    }

    pub fn is_failed(&self) -> bool {
        matches!(
            self.status,
            TransactionStatus::Declined | TransactionStatus::Error
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transaction_no(&self) -> &str {
        &self.transaction_no
    }

    pub fn product_id(&self) -> Uuid {
        self.product_id
    }

    pub fn customer_id(&self) -> Uuid {
        self.customer_id
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn amount(&self) -> &BigDecimal {
        &self.amount
    }

    pub fn base_fee(&self) -> &BigDecimal {
        &self.base_fee
    }

    pub fn delivery_fee(&self) -> &BigDecimal {
        &self.delivery_fee
    }

    pub fn total_amount(&self) -> &BigDecimal {
        &self.total_amount
    }

    pub fn gateway_transaction_id(&self) -> Option<&str> {
        self.gateway_transaction_id.as_deref()
    }

    pub fn gateway_reference(&self) -> Option<&str> {
        self.gateway_reference.as_deref()
    }

    pub fn card_brand(&self) -> Option<&str> {
        self.card_brand.as_deref()
    }

    pub fn card_last_four(&self) -> Option<&str> {
        self.card_last_four.as_deref()
    }

    /// Optimistic concurrency counter, bumped by the repository on every update.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Called by repositories after a successful conditional write.
    pub fn set_version(&mut self, version: i32) {
        self.version = version;
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn to_record(&self) -> TransactionRecord {
        TransactionRecord {
            id: self.id,
            transaction_no: self.transaction_no.clone(),
            product_id: self.product_id,
            customer_id: self.customer_id,
            status: self.status,
            amount: self.amount.clone(),
            base_fee: self.base_fee.clone(),
            delivery_fee: self.delivery_fee.clone(),
            total_amount: self.total_amount.clone(),
            gateway_transaction_id: self.gateway_transaction_id.clone(),
            gateway_reference: self.gateway_reference.clone(),
            card_brand: self.card_brand.clone(),
            card_last_four: self.card_last_four.clone(),
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
