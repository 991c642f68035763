//! Order pricing.
//!
//! Amounts are kept in whole currency units as `BigDecimal`; the payment
//! gateway works in minor units (cents), see [`to_minor_units`].

use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{Deserialize, Serialize};

use super::error::{DomainError, DomainResult};

/// Flat fees added to every order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub base_fee: BigDecimal,
    pub delivery_fee: BigDecimal,
}

/// Price breakdown of a single-product order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub amount: BigDecimal,
    pub base_fee: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total_amount: BigDecimal,
}

impl FeeSchedule {
    pub fn new(base_fee: BigDecimal, delivery_fee: BigDecimal) -> DomainResult<Self> {
        let zero = BigDecimal::from(0);
        if base_fee < zero {
            return Err(DomainError::Invariant("Base fee cannot be negative"));
        }
        if delivery_fee < zero {
            return Err(DomainError::Invariant("Delivery fee cannot be negative"));
        }
        Ok(Self {
            base_fee,
            delivery_fee,
        })
    }

    /// No fees at all.
    pub fn free() -> Self {
        Self {
            base_fee: BigDecimal::from(0),
            delivery_fee: BigDecimal::from(0),
        }
    }

    /// `amount = unit_price * quantity`, `total = amount + base_fee + delivery_fee`.
    pub fn quote(&self, unit_price: &BigDecimal, quantity: i32) -> DomainResult<OrderTotals> {
        if *unit_price < BigDecimal::from(0) {
            return Err(DomainError::Invariant("Product price cannot be negative"));
        }
        if quantity < 1 {
            return Err(DomainError::InvalidQuantity);
        }

        let amount = unit_price * BigDecimal::from(quantity);
        let total_amount = &amount + &self.base_fee + &self.delivery_fee;

        Ok(OrderTotals {
            amount,
            base_fee: self.base_fee.clone(),
            delivery_fee: self.delivery_fee.clone(),
            total_amount,
        })
    }
}

/// Converts a currency amount to the gateway's minor units, rounding to the
/// nearest integer.
pub fn to_minor_units(amount: &BigDecimal) -> DomainResult<i64> {
    (amount * BigDecimal::from(100))
        .round(0)
        .to_i64()
        .ok_or(DomainError::Invariant("Amount does not fit in minor units"))
}
