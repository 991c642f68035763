//! Application use cases. Each one holds its ports as `Arc<dyn ...>` and
//! exposes a single `execute`.

pub mod catalog;
pub mod create_transaction;
pub mod error;
pub mod get_transaction;
pub mod process_payment;
pub mod recover_transaction;

pub use catalog::{GetProduct, ListProducts, ProductView};
pub use create_transaction::{CreateTransaction, CreateTransactionInput, CreateTransactionOutput};
pub use error::{UseCaseError, UseCaseResult};
pub use get_transaction::{GetTransaction, TransactionDetail};
pub use process_payment::{
    ProcessPayment, ProcessPaymentInput, ProcessPaymentOutput, UNITS_PER_SETTLEMENT,
};
pub use recover_transaction::{RecoverTransaction, RecoveredTransaction};
