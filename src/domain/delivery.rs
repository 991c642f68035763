//! Delivery domain entity, paired 1:1 with a transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{require_min_len, require_present, DomainError, DomainResult};

/// Shipping details supplied by the buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub details: DeliveryDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    id: Uuid,
    transaction_id: Uuid,
    details: DeliveryDetails,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Delivery {
    pub fn new(transaction_id: Uuid, details: DeliveryDetails) -> DomainResult<Self> {
        let now = Utc::now();
        Self::restore(DeliveryRecord {
            id: Uuid::new_v4(),
            transaction_id,
            details,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn restore(record: DeliveryRecord) -> DomainResult<Self> {
        if record.transaction_id.is_nil() {
            return Err(DomainError::Invariant("Transaction ID is required"));
        }
        validate_details(&record.details)?;

        Ok(Self {
            id: record.id,
            transaction_id: record.transaction_id,
            details: record.details,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Replaces the shipping details. The transaction link never changes.
    pub fn update_details(&mut self, details: DeliveryDetails) -> DomainResult<()> {
        validate_details(&details)?;
        self.details = details;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transaction_id(&self) -> Uuid {
        self.transaction_id
    }

    pub fn details(&self) -> &DeliveryDetails {
        &self.details
    }

    pub fn full_name(&self) -> &str {
        &self.details.full_name
    }

    pub fn phone(&self) -> &str {
        &self.details.phone
    }

    pub fn address(&self) -> &str {
        &self.details.address
    }

    pub fn city(&self) -> &str {
        &self.details.city
    }

    pub fn state(&self) -> &str {
        &self.details.state
    }

    pub fn postal_code(&self) -> Option<&str> {
        self.details.postal_code.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn to_record(&self) -> DeliveryRecord {
        DeliveryRecord {
            id: self.id,
            transaction_id: self.transaction_id,
            details: self.details.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn validate_details(details: &DeliveryDetails) -> DomainResult<()> {
    require_min_len(
        &details.full_name,
        3,
        "Delivery full name is required",
        "Delivery full name must be at least 3 characters",
    )?;
    require_present(&details.phone, "Delivery phone is required")?;
    require_min_len(
        &details.address,
        10,
        "Delivery address is required",
        "Delivery address must be at least 10 characters",
    )?;
    require_present(&details.city, "Delivery city is required")?;
    require_present(&details.state, "Delivery state is required")?;
    Ok(())
}
