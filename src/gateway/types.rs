//! Wire types of the gateway's JSON API.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ports::GatewayStatus;

/// Every successful response wraps its payload in `data`.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Serialize)]
pub struct TokenizeCardRequest<'a> {
    pub number: &'a str,
    pub exp_month: &'a str,
    pub exp_year: &'a str,
    pub cvc: &'a str,
    pub card_holder: &'a str,
}

impl fmt::Debug for TokenizeCardRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits: Vec<char> = self.number.chars().collect();
        let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
        f.debug_struct("TokenizeCardRequest")
            .field("number", &format!("****{}", tail))
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("cvc", &"***")
            .field("card_holder", &self.card_holder)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct CardTokenData {
    pub id: String,
    pub brand: Option<String>,
    pub last_four: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MerchantData {
    pub presigned_acceptance: Option<PresignedAcceptance>,
}

#[derive(Debug, Deserialize)]
pub struct PresignedAcceptance {
    pub acceptance_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateTransactionRequest<'a> {
    pub acceptance_token: &'a str,
    pub amount_in_cents: i64,
    pub currency: &'a str,
    pub customer_email: &'a str,
    pub reference: &'a str,
    pub payment_method: PaymentMethod<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentMethod<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub token: &'a str,
    pub installments: u32,
}

#[derive(Debug, Deserialize)]
pub struct TransactionData {
    pub id: String,
    pub status: GatewayStatus,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
}

/// `{"error": {"type": ..., "messages": {...}}}`
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub messages: Value,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ErrorBody {
    /// Joins every message under `messages` with `", "`. Falls back to
    /// `reason`, then to the error type.
    pub fn flatten(&self) -> String {
        let mut parts = Vec::new();
        collect_messages(&self.messages, &mut parts);

        if !parts.is_empty() {
            return parts.join(", ");
        }
        self.reason
            .clone()
            .or_else(|| self.kind.clone())
            .unwrap_or_else(|| "Unknown payment gateway error".to_string())
    }
}

fn collect_messages(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(message) => out.push(message.clone()),
        Value::Array(items) => items.iter().for_each(|item| collect_messages(item, out)),
        Value::Object(fields) => fields.values().for_each(|field| collect_messages(field, out)),
        _ => {}
    }
}
