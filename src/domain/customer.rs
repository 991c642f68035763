//! Customer domain entity.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{require_min_len, DomainError, DomainResult};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Persisted shape of a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A buyer, identified by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: Uuid,
    email: String,
    full_name: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(email: &str, full_name: &str, phone: Option<String>) -> DomainResult<Self> {
        let now = Utc::now();
        Self::restore(CustomerRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            phone,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a customer from storage, re-checking every rule.
    pub fn restore(record: CustomerRecord) -> DomainResult<Self> {
        validate_email(&record.email)?;
        validate_full_name(&record.full_name)?;

        Ok(Self {
            id: record.id,
            email: record.email,
            full_name: record.full_name,
            phone: record.phone,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Whether applying `update_info(full_name, phone)` would change anything.
    /// An absent phone never counts as a change because it is not applied.
    pub fn differs_from(&self, full_name: &str, phone: Option<&str>) -> bool {
        if self.full_name != full_name {
            return true;
        }
        match phone {
            Some(phone) => self.phone.as_deref() != Some(phone),
            None => false,
        }
    }

    /// Replaces the name and, when supplied, the phone. Leaves the customer
    /// untouched if the new name is invalid.
    pub fn update_info(&mut self, full_name: &str, phone: Option<String>) -> DomainResult<()> {
        validate_full_name(full_name)?;

        self.full_name = full_name.to_string();
        if phone.is_some() {
            self.phone = phone;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn to_record(&self) -> CustomerRecord {
        CustomerRecord {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn validate_email(email: &str) -> DomainResult<()> {
    if email.trim().is_empty() {
        return Err(DomainError::Invariant("Customer email is required"));
    }
    if !is_valid_email(email) {
        return Err(DomainError::Invariant("Customer email is invalid"));
    }
    Ok(())
}

fn validate_full_name(full_name: &str) -> DomainResult<()> {
    require_min_len(
        full_name,
        3,
        "Customer full name is required",
        "Customer full name must be at least 3 characters",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_customer_is_valid() {
        let customer = Customer::new("ana@example.com", "Ana Gomez", None).unwrap();
        assert_eq!(customer.email(), "ana@example.com");
        assert_eq!(customer.full_name(), "Ana Gomez");
        assert!(customer.phone().is_none());
    }

    #[test]
    fn test_rejects_invalid_email() {
        for email in ["", "plain", "no-domain@", "a@b", "with space@example.com"] {
            let result = Customer::new(email, "Ana Gomez", None);
            assert!(result.is_err(), "accepted {email:?}");
        }
    }

    #[test]
    fn test_rejects_short_name() {
        let err = Customer::new("ana@example.com", "  Al ", None).unwrap_err();
        assert_eq!(
            err,
            DomainError::Invariant("Customer full name must be at least 3 characters")
        );
    }

    #[test]
    fn test_update_info_keeps_phone_when_absent() {
        let mut customer =
            Customer::new("ana@example.com", "Ana Gomez", Some("3001234567".into())).unwrap();
        customer.update_info("Ana Maria Gomez", None).unwrap();

        assert_eq!(customer.full_name(), "Ana Maria Gomez");
        assert_eq!(customer.phone(), Some("3001234567"));
    }

    #[test]
    fn test_update_info_rejects_short_name_without_mutating() {
        let mut customer = Customer::new("ana@example.com", "Ana Gomez", None).unwrap();
        let before = customer.clone();

        assert!(customer.update_info("Al", Some("3001234567".into())).is_err());
        assert_eq!(customer, before);
    }

    #[test]
    fn test_differs_from() {
        let customer =
            Customer::new("ana@example.com", "Ana Gomez", Some("3001234567".into())).unwrap();

        assert!(!customer.differs_from("Ana Gomez", Some("3001234567")));
        assert!(!customer.differs_from("Ana Gomez", None));
        assert!(customer.differs_from("Ana G.", Some("3001234567")));
        assert!(customer.differs_from("Ana Gomez", Some("3110000000")));
    }
}
