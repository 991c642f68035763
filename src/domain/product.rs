//! Product domain entity and its stock ledger.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{require_present, DomainError, DomainResult};

/// Persisted shape of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock_quantity: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial catalog edit. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: Uuid,
    name: String,
    description: Option<String>,
    price: BigDecimal,
    stock_quantity: i32,
    image_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        name: &str,
        description: Option<String>,
        price: BigDecimal,
        stock_quantity: i32,
        image_url: Option<String>,
    ) -> DomainResult<Self> {
        let now = Utc::now();
        Self::restore(ProductRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description,
            price,
            stock_quantity,
            image_url,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn restore(record: ProductRecord) -> DomainResult<Self> {
        require_present(&record.name, "Product name is required")?;
        validate_price(&record.price)?;
        if record.stock_quantity < 0 {
            return Err(DomainError::Invariant(
                "Product stock quantity cannot be negative",
            ));
        }

        Ok(Self {
            id: record.id,
            name: record.name,
            description: record.description,
            price: record.price,
            stock_quantity: record.stock_quantity,
            image_url: record.image_url,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Active and with at least one unit left.
    pub fn is_available(&self) -> bool {
        self.is_active && self.stock_quantity > 0
    }

    pub fn has_stock(&self, quantity: i32) -> bool {
        self.stock_quantity >= quantity
    }

    /// Takes `quantity` units out of stock. On error the stock is unchanged.
    pub fn decrease_stock(&mut self, quantity: i32) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::InvalidQuantity);
        }
        if !self.has_stock(quantity) {
            return Err(DomainError::InsufficientStock {
                available: self.stock_quantity,
                requested: quantity,
            });
        }

        self.stock_quantity -= quantity;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn increase_stock(&mut self, quantity: i32) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::InvalidQuantity);
        }
        self.stock_quantity = self
            .stock_quantity
            .checked_add(quantity)
            .ok_or(DomainError::Invariant("Product stock quantity overflow"))?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    /// Applies a catalog edit. Either every supplied field is valid and
    /// applied, or nothing changes.
    pub fn update_info(&mut self, update: ProductUpdate) -> DomainResult<()> {
        if let Some(name) = &update.name {
            require_present(name, "Product name is required")?;
        }
        if let Some(price) = &update.price {
            validate_price(price)?;
        }

        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> &BigDecimal {
        &self.price
    }

    pub fn stock_quantity(&self) -> i32 {
        self.stock_quantity
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn to_record(&self) -> ProductRecord {
        ProductRecord {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price.clone(),
            stock_quantity: self.stock_quantity,
            image_url: self.image_url.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn validate_price(price: &BigDecimal) -> DomainResult<()> {
    if *price < BigDecimal::from(0) {
        return Err(DomainError::Invariant("Product price cannot be negative"));
    }
    Ok(())
}
