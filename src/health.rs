use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::gateway::WompiClient;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub dependencies: HashMap<String, DependencyStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyStatus {
    Healthy { status: String, latency_ms: u64 },
    Unhealthy { status: String, error: String },
}

impl DependencyStatus {
    fn healthy(start: Instant) -> Self {
        DependencyStatus::Healthy {
            status: "healthy".to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn unhealthy(error: impl ToString) -> Self {
        DependencyStatus::Unhealthy {
            status: "unhealthy".to_string(),
            error: error.to_string(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, DependencyStatus::Healthy { .. })
    }
}

#[async_trait]
pub trait DependencyChecker: Send + Sync {
    fn name(&self) -> &'static str;

    /// A failing critical dependency makes the service unhealthy; any other
    /// failure only degrades it.
    fn is_critical(&self) -> bool {
        false
    }

    async fn check(&self) -> DependencyStatus;
}

pub struct PostgresChecker {
    pool: sqlx::PgPool,
}

impl PostgresChecker {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DependencyChecker for PostgresChecker {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn is_critical(&self) -> bool {
        true
    }

    async fn check(&self) -> DependencyStatus {
        let start = Instant::now();
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => DependencyStatus::healthy(start),
            Err(e) => DependencyStatus::unhealthy(e),
        }
    }
}

pub struct GatewayChecker {
    client: Arc<WompiClient>,
}

impl GatewayChecker {
    pub fn new(client: Arc<WompiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DependencyChecker for GatewayChecker {
    fn name(&self) -> &'static str {
        "payment_gateway"
    }

    async fn check(&self) -> DependencyStatus {
        let start = Instant::now();
        match self.client.probe().await {
            Ok(()) => DependencyStatus::healthy(start),
            Err(e) => DependencyStatus::unhealthy(e),
        }
    }
}

pub async fn check_health(
    checkers: &[Arc<dyn DependencyChecker>],
    start_time: Instant,
) -> HealthResponse {
    let results = join_all(checkers.iter().map(|checker| async move {
        let status = timeout(CHECK_TIMEOUT, checker.check())
            .await
            .unwrap_or_else(|_| DependencyStatus::unhealthy("timeout"));
        (checker.name(), checker.is_critical(), status)
    }))
    .await;

    let mut has_critical_failure = false;
    let mut has_non_critical_failure = false;
    let mut dependencies = HashMap::new();

    for (name, critical, status) in results {
        if !status.is_healthy() {
            if critical {
                has_critical_failure = true;
            } else {
                has_non_critical_failure = true;
            }
        }
        dependencies.insert(name.to_string(), status);
    }

    let status = if has_critical_failure {
        "unhealthy"
    } else if has_non_critical_failure {
        "degraded"
    } else {
        "healthy"
    };

    HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: start_time.elapsed().as_secs(),
        dependencies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticChecker {
        name: &'static str,
        critical: bool,
        healthy: bool,
    }

    #[async_trait]
    impl DependencyChecker for StaticChecker {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_critical(&self) -> bool {
            self.critical
        }

        async fn check(&self) -> DependencyStatus {
            if self.healthy {
                DependencyStatus::healthy(Instant::now())
            } else {
                DependencyStatus::unhealthy("connection refused")
            }
        }
    }

    fn checker(name: &'static str, critical: bool, healthy: bool) -> Arc<dyn DependencyChecker> {
        Arc::new(StaticChecker {
            name,
            critical,
            healthy,
        })
    }

    #[tokio::test]
    async fn test_all_dependencies_healthy() {
        let response = check_health(
            &[checker("postgres", true, true), checker("payment_gateway", false, true)],
            Instant::now(),
        )
        .await;

        assert_eq!(response.status, "healthy");
        assert_eq!(response.dependencies.len(), 2);
    }

    #[tokio::test]
    async fn test_gateway_failure_degrades() {
        let response = check_health(
            &[checker("postgres", true, true), checker("payment_gateway", false, false)],
            Instant::now(),
        )
        .await;

        assert_eq!(response.status, "degraded");
        assert!(!response.dependencies["payment_gateway"].is_healthy());
    }

    #[tokio::test]
    async fn test_database_failure_is_unhealthy() {
        let response = check_health(
            &[checker("postgres", true, false), checker("payment_gateway", false, true)],
            Instant::now(),
        )
        .await;

        assert_eq!(response.status, "unhealthy");
    }

    #[tokio::test]
    async fn test_no_checkers_is_healthy() {
        let response = check_health(&[], Instant::now()).await;
        assert_eq!(response.status, "healthy");
        assert!(response.dependencies.is_empty());
    }
}
