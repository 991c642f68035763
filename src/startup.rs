use crate::config::Config;
use crate::gateway::WompiClient;
use anyhow::{Context, Result};
use sqlx::PgPool;

pub struct ValidationReport {
    pub environment: bool,
    pub database: Option<bool>,
    pub gateway: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.environment && self.database.unwrap_or(true) && self.gateway
    }

    pub fn print(&self) {
        println!("\n=== Startup Validation Report ===");
        println!("Environment Variables: {}", status(self.environment));
        match self.database {
            Some(ok) => println!("Database Connectivity: {}", status(ok)),
            None => println!("Database Connectivity: skipped (in-memory)"),
        }
        println!("Payment Gateway:       {}", status(self.gateway));

        if !self.errors.is_empty() {
            println!("\nErrors:");
            for error in &self.errors {
                println!("  ❌ {}", error);
            }
        }

        println!("\nOverall Status: {}", if self.is_valid() { "✅ PASS" } else { "❌ FAIL" });
        println!("=================================\n");
    }
}

fn status(ok: bool) -> &'static str {
    if ok { "✅ OK" } else { "❌ FAIL" }
}

/// Checks configuration and reachability before serving. `pool` is `None` in
/// in-memory mode.
pub async fn validate_environment(
    config: &Config,
    pool: Option<&PgPool>,
    gateway: &WompiClient,
) -> ValidationReport {
    let mut report = ValidationReport {
        environment: true,
        database: None,
        gateway: true,
        errors: Vec::new(),
    };

    if let Err(e) = validate_env_vars(config) {
        report.environment = false;
        report.errors.push(format!("Environment: {:#}", e));
    }

    if let Some(pool) = pool {
        let result = validate_database(pool).await;
        report.database = Some(result.is_ok());
        if let Err(e) = result {
            report.errors.push(format!("Database: {:#}", e));
        }
    }

    if let Err(e) = gateway.probe().await {
        report.gateway = false;
        report.errors.push(format!("Payment gateway: {}", e));
    }

    report
}

pub fn validate_env_vars(config: &Config) -> Result<()> {
    if config.server_port == 0 {
        anyhow::bail!("SERVER_PORT must be greater than 0");
    }
    if config.gateway.public_key.trim().is_empty() {
        anyhow::bail!("WOMPI_PUBLIC_KEY is empty");
    }
    if config.gateway.polling_interval.is_zero() {
        anyhow::bail!("WOMPI_POLLING_INTERVAL_MS must be greater than 0");
    }
    if config.gateway.polling_timeout < config.gateway.polling_interval {
        anyhow::bail!("WOMPI_POLLING_TIMEOUT_MS must not be shorter than the polling interval");
    }

    let url = url::Url::parse(&config.gateway.base_url)
        .context("WOMPI_BASE_URL is not a valid URL")?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("WOMPI_BASE_URL must use http or https");
    }

    config.fees.schedule()?;

    Ok(())
}

async fn validate_database(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .context("Failed to connect to database")?;

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .context("Failed to check migrations table")?;

    if applied == 0 {
        anyhow::bail!("No migrations applied");
    }

    Ok(())
}
