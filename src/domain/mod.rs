//! Framework-agnostic checkout entities.

pub mod customer;
pub mod delivery;
pub mod error;
pub mod money;
pub mod product;
pub mod transaction;

pub use customer::{Customer, CustomerRecord};
pub use delivery::{Delivery, DeliveryDetails, DeliveryRecord};
pub use error::{DomainError, DomainResult};
pub use money::{to_minor_units, FeeSchedule, OrderTotals};
pub use product::{Product, ProductRecord, ProductUpdate};
pub use transaction::{PaymentReceipt, Transaction, TransactionRecord, TransactionStatus};
