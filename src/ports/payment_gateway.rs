//! Card-payment gateway port.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The gateway answered with an error body; holds its flattened messages.
    #[error("{0}")]
    Rejected(String),

    #[error("Error connecting to payment gateway: {0}")]
    Transport(String),

    #[error("Acceptance token not found in payment gateway response")]
    MissingAcceptanceToken,

    #[error("Invalid payment gateway response: {0}")]
    InvalidResponse(String),

    #[error("Circuit breaker open: payment gateway unavailable")]
    CircuitBreakerOpen,

    #[error("Polling timeout exceeded")]
    PollingTimeoutExceeded,
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

/// Raw card data as entered by the buyer. Never logged as is.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct CardData {
    pub number: String,
    pub exp_month: String,
    pub exp_year: String,
    pub cvc: String,
    pub card_holder: String,
}

impl CardData {
    /// Strips whitespace from the number and zero-pads the month to two digits.
    pub fn normalized(&self) -> CardData {
        let exp_month = self.exp_month.trim();
        CardData {
            number: self.number.chars().filter(|c| !c.is_whitespace()).collect(),
            exp_month: format!("{:0>2}", exp_month),
            exp_year: self.exp_year.trim().to_string(),
            cvc: self.cvc.trim().to_string(),
            card_holder: self.card_holder.trim().to_string(),
        }
    }

    /// `****` followed by the last four digits.
    pub fn masked_number(&self) -> String {
        let digits: Vec<char> = self.number.chars().filter(|c| !c.is_whitespace()).collect();
        let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
        format!("****{}", tail)
    }
}

impl fmt::Debug for CardData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardData")
            .field("number", &self.masked_number())
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("cvc", &"***")
            .field("card_holder", &self.card_holder)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardToken {
    pub token: String,
    pub brand: Option<String>,
    pub last_four: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    pub amount_in_cents: i64,
    pub currency: String,
    pub customer_email: String,
    /// Our transaction number, used by the gateway as idempotency reference.
    pub reference: String,
    pub token: String,
    pub installments: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayStatus {
    Pending,
    Approved,
    Declined,
    Error,
    Voided,
    #[serde(other)]
    Unknown,
}

impl GatewayStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, GatewayStatus::Pending)
    }
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GatewayStatus::Pending => "PENDING",
            GatewayStatus::Approved => "APPROVED",
            GatewayStatus::Declined => "DECLINED",
            GatewayStatus::Error => "ERROR",
            GatewayStatus::Voided => "VOIDED",
            GatewayStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// A charge as seen by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayTransaction {
    pub id: String,
    pub status: GatewayStatus,
    pub reference: String,
    pub status_message: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn tokenize_card(&self, card: &CardData) -> GatewayResult<CardToken>;

    /// Creates a charge. Implementations attach the acceptance token themselves.
    async fn create_charge(&self, request: &ChargeRequest) -> GatewayResult<GatewayTransaction>;

    async fn get_transaction_status(&self, id: &str) -> GatewayResult<GatewayTransaction>;

    /// Drops any cached acceptance token so the next charge fetches a fresh one.
    async fn invalidate_acceptance_token(&self);
}
