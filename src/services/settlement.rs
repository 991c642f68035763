//! Bounded polling of a gateway charge until it leaves PENDING.

use std::time::Duration;

use crate::ports::{GatewayError, GatewayResult, GatewayTransaction, PaymentGateway};

/// Fixed-interval polling budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(30),
        }
    }
}

impl PollingPolicy {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// `floor(timeout / interval)`. A zero interval allows a single attempt.
    pub fn max_attempts(&self) -> u32 {
        if self.interval.is_zero() {
            return 1;
        }
        let attempts = self.timeout.as_nanos() / self.interval.as_nanos();
        u32::try_from(attempts).unwrap_or(u32::MAX)
    }
}

/// Queries the charge until the gateway reports a terminal status.
///
/// The first non-PENDING answer wins. Gateway errors abort the loop. When the
/// attempt budget runs out the result is [`GatewayError::PollingTimeoutExceeded`].
pub async fn poll_until_settled(
    gateway: &dyn PaymentGateway,
    gateway_transaction_id: &str,
    policy: &PollingPolicy,
) -> GatewayResult<GatewayTransaction> {
    let max_attempts = policy.max_attempts();

    for attempt in 1..=max_attempts {
        let charge = gateway.get_transaction_status(gateway_transaction_id).await?;
        if !charge.status.is_pending() {
            tracing::info!(
                gateway_transaction_id,
                status = %charge.status,
                attempt,
                "Charge settled"
            );
            return Ok(charge);
        }

        tracing::debug!(gateway_transaction_id, attempt, max_attempts, "Charge still pending");
        if attempt < max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    tracing::warn!(gateway_transaction_id, max_attempts, "Polling budget exhausted");
    Err(GatewayError::PollingTimeoutExceeded)
}
