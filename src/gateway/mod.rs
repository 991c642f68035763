//! HTTP client for the card-payment gateway.

pub mod client;
pub mod signature;
pub mod types;

pub use client::WompiClient;
