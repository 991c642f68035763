//! Ports: the interfaces the use cases depend on.
//! Adapters in `crate::adapters` and `crate::gateway` implement them.

pub mod payment_gateway;
pub mod repositories;

pub use payment_gateway::{
    CardData, CardToken, ChargeRequest, GatewayError, GatewayResult, GatewayStatus,
    GatewayTransaction, PaymentGateway,
};
pub use repositories::{
    CustomerRepository, DeliveryRepository, ProductRepository, RepositoryError, RepositoryResult,
    TransactionRepository,
};
