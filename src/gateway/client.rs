use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use super::signature::integrity_signature;
use super::types::{
    CardTokenData, CreateTransactionRequest, DataEnvelope, ErrorEnvelope, MerchantData,
    PaymentMethod, TokenizeCardRequest, TransactionData,
};
use crate::config::GatewayConfig;
use crate::ports::{
    CardData, CardToken, ChargeRequest, GatewayError, GatewayResult, GatewayTransaction,
    PaymentGateway,
};

type Breaker = StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>;

/// HTTP client for the Wompi payment gateway.
///
/// Transport calls go through a circuit breaker; gateway-side rejections
/// (4xx with an error body) do not count as breaker failures.
#[derive(Clone)]
pub struct WompiClient {
    client: Client,
    base_url: String,
    public_key: String,
    integrity_key: Option<String>,
    acceptance_token: Arc<RwLock<Option<String>>>,
    circuit_breaker: Breaker,
}

impl WompiClient {
    pub fn new(config: &GatewayConfig) -> Self {
        Self::with_circuit_breaker(config, 5, 60)
    }

    /// Creates a client with custom circuit breaker configuration
    pub fn with_circuit_breaker(
        config: &GatewayConfig,
        failure_threshold: u32,
        reset_timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();

        let backoff = backoff::equal_jittered(
            Duration::from_secs(reset_timeout_secs),
            Duration::from_secs(reset_timeout_secs * 2),
        );
        let policy = failure_policy::consecutive_failures(failure_threshold, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        tracing::info!(base_url = %config.base_url, "Payment gateway client initialized");

        WompiClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            public_key: config.public_key.clone(),
            integrity_key: config.integrity_key.clone(),
            acceptance_token: Arc::new(RwLock::new(None)),
            circuit_breaker,
        }
    }

    pub fn circuit_state(&self) -> &'static str {
        if self.circuit_breaker.is_call_permitted() {
            "closed"
        } else {
            "open"
        }
    }

    /// Cheap reachability check used by the health endpoint.
    pub async fn probe(&self) -> GatewayResult<()> {
        let request = self
            .client
            .get(self.url(&format!("/merchants/{}", self.public_key)));
        self.send(request).await.map(|_| ())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let result = self
            .circuit_breaker
            .call(async move {
                let response = request.send().await?;
                if response.status().is_server_error() {
                    return Err(GatewayError::Transport(format!(
                        "Request failed with status code {}",
                        response.status().as_u16()
                    )));
                }
                Ok(response)
            })
            .await;

        match result {
            Ok(response) => Ok(response),
            Err(FailsafeError::Rejected) => Err(GatewayError::CircuitBreakerOpen),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => GatewayError::Rejected(envelope.error.flatten()),
                Err(_) => GatewayError::Transport(format!(
                    "Request failed with status code {}",
                    status.as_u16()
                )),
            };
            tracing::error!(status = status.as_u16(), error = %err, "Payment gateway error");
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    /// Returns the cached acceptance token, fetching it on first use.
    async fn acceptance_token(&self) -> GatewayResult<String> {
        if let Some(token) = self.acceptance_token.read().await.as_ref() {
            return Ok(token.clone());
        }

        tracing::info!("Fetching acceptance token");
        let request = self
            .client
            .get(self.url(&format!("/merchants/{}", self.public_key)));
        let response = self.send(request).await?;
        let merchant: DataEnvelope<MerchantData> = Self::decode(response).await?;

        let token = merchant
            .data
            .presigned_acceptance
            .and_then(|p| p.acceptance_token)
            .filter(|t| !t.is_empty())
            .ok_or(GatewayError::MissingAcceptanceToken)?;

        *self.acceptance_token.write().await = Some(token.clone());
        Ok(token)
    }
}

#[async_trait]
impl PaymentGateway for WompiClient {
    async fn tokenize_card(&self, card: &CardData) -> GatewayResult<CardToken> {
        let card = card.normalized();
        tracing::debug!(card = ?card, "Tokenizing card");

        let body = TokenizeCardRequest {
            number: &card.number,
            exp_month: &card.exp_month,
            exp_year: &card.exp_year,
            cvc: &card.cvc,
            card_holder: &card.card_holder,
        };
        let request = self
            .client
            .post(self.url("/tokens/cards"))
            .bearer_auth(&self.public_key)
            .json(&body);

        let response = self.send(request).await?;
        let token: DataEnvelope<CardTokenData> = Self::decode(response).await?;

        tracing::info!(brand = ?token.data.brand, "Card tokenized");
        Ok(CardToken {
            token: token.data.id,
            brand: token.data.brand,
            last_four: token.data.last_four,
        })
    }

    async fn create_charge(&self, charge: &ChargeRequest) -> GatewayResult<GatewayTransaction> {
        let acceptance_token = self.acceptance_token().await?;
        let signature = self.integrity_key.as_deref().map(|key| {
            integrity_signature(
                &charge.reference,
                charge.amount_in_cents,
                &charge.currency,
                key,
            )
        });

        let body = CreateTransactionRequest {
            acceptance_token: &acceptance_token,
            amount_in_cents: charge.amount_in_cents,
            currency: &charge.currency,
            customer_email: &charge.customer_email,
            reference: &charge.reference,
            payment_method: PaymentMethod {
                kind: "CARD",
                token: &charge.token,
                installments: charge.installments,
            },
            signature,
        };

        tracing::info!(
            reference = %charge.reference,
            amount_in_cents = charge.amount_in_cents,
            "Creating charge"
        );
        let request = self
            .client
            .post(self.url("/transactions"))
            .bearer_auth(&self.public_key)
            .json(&body);

        let response = self.send(request).await?;
        let created: DataEnvelope<TransactionData> = Self::decode(response).await?;

        Ok(into_gateway_transaction(created.data, &charge.reference))
    }

    async fn get_transaction_status(&self, id: &str) -> GatewayResult<GatewayTransaction> {
        let request = self
            .client
            .get(self.url(&format!("/transactions/{}", id)))
            .bearer_auth(&self.public_key);

        let response = self.send(request).await?;
        let found: DataEnvelope<TransactionData> = Self::decode(response).await?;

        Ok(into_gateway_transaction(found.data, ""))
    }

    async fn invalidate_acceptance_token(&self) {
        *self.acceptance_token.write().await = None;
    }
}

fn into_gateway_transaction(data: TransactionData, fallback_reference: &str) -> GatewayTransaction {
    GatewayTransaction {
        id: data.id,
        status: data.status,
        reference: data
            .reference
            .unwrap_or_else(|| fallback_reference.to_string()),
        status_message: data.status_message,
    }
}
