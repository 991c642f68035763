use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use bigdecimal::BigDecimal;
use dotenvy::dotenv;

use crate::domain::FeeSchedule;
use crate::services::PollingPolicy;

pub const DEFAULT_GATEWAY_URL: &str = "https://api-sandbox.co.uat.wompi.dev/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Required by every command except `serve --in-memory`.
    pub database_url: Option<String>,
    pub log_format: LogFormat,
    /// Log sanitized request bodies.
    pub log_request_body: bool,
    pub gateway: GatewayConfig,
    pub fees: FeeConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub public_key: String,
    pub private_key: String,
    /// Charges are signed only when this is set.
    pub integrity_key: Option<String>,
    pub request_timeout: Duration,
    pub polling_interval: Duration,
    pub polling_timeout: Duration,
    pub currency: String,
}

impl GatewayConfig {
    pub fn polling_policy(&self) -> PollingPolicy {
        PollingPolicy::new(self.polling_interval, self.polling_timeout)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATEWAY_URL.to_string(),
            public_key: String::new(),
            private_key: String::new(),
            integrity_key: None,
            request_timeout: Duration::from_millis(30_000),
            polling_interval: Duration::from_millis(2_000),
            polling_timeout: Duration::from_millis(30_000),
            currency: "COP".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeeConfig {
    pub base_fee: BigDecimal,
    pub delivery_fee: BigDecimal,
}

impl FeeConfig {
    pub fn schedule(&self) -> anyhow::Result<FeeSchedule> {
        FeeSchedule::new(self.base_fee.clone(), self.delivery_fee.clone())
            .context("invalid fee configuration")
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = GatewayConfig::default();

        let gateway = GatewayConfig {
            base_url: get("WOMPI_BASE_URL").unwrap_or(defaults.base_url),
            public_key: get("WOMPI_PUBLIC_KEY").unwrap_or_default(),
            private_key: get("WOMPI_PRIVATE_KEY").unwrap_or_default(),
            integrity_key: get("WOMPI_INTEGRITY_KEY"),
            request_timeout: parse_millis(
                get("WOMPI_REQUEST_TIMEOUT_MS"),
                "WOMPI_REQUEST_TIMEOUT_MS",
                defaults.request_timeout,
            )?,
            polling_interval: parse_millis(
                get("WOMPI_POLLING_INTERVAL_MS"),
                "WOMPI_POLLING_INTERVAL_MS",
                defaults.polling_interval,
            )?,
            polling_timeout: parse_millis(
                get("WOMPI_POLLING_TIMEOUT_MS"),
                "WOMPI_POLLING_TIMEOUT_MS",
                defaults.polling_timeout,
            )?,
            currency: get("PAYMENT_CURRENCY").unwrap_or(defaults.currency),
        };

        let fees = FeeConfig {
            base_fee: parse_decimal(get("BASE_FEE"), "BASE_FEE")?,
            delivery_fee: parse_decimal(get("DELIVERY_FEE"), "DELIVERY_FEE")?,
        };

        let log_format = match get("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Config {
            server_port: get("SERVER_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a port number")?,
            database_url: get("DATABASE_URL"),
            log_format,
            log_request_body: get("LOG_REQUEST_BODY")
                .map(|value| value.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            gateway,
            fees,
        })
    }

    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set")
    }
}

fn parse_millis(raw: Option<String>, key: &str, default: Duration) -> anyhow::Result<Duration> {
    match raw {
        Some(value) => {
            let millis: u64 = value
                .trim()
                .parse()
                .with_context(|| format!("{key} must be a number of milliseconds"))?;
            Ok(Duration::from_millis(millis))
        }
        None => Ok(default),
    }
}

fn parse_decimal(raw: Option<String>, key: &str) -> anyhow::Result<BigDecimal> {
    match raw {
        Some(value) => BigDecimal::from_str(value.trim())
            .with_context(|| format!("{key} must be a decimal amount")),
        None => Ok(BigDecimal::from(0)),
    }
}
