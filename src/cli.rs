use clap::{Parser, Subcommand};

use crate::adapters::PostgresProductRepository;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "checkout-core")]
#[command(about = "Checkout Core - single-product checkout with card settlement", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Use in-memory repositories seeded with the demo catalog instead of Postgres
        #[arg(long)]
        in_memory: bool,
    },

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Configuration validation
    Config,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,

    /// Insert the demo product catalog when no products exist
    Seed,
}

pub async fn handle_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config.require_database_url()?).await?;

    tracing::info!("Running database migrations...");
    crate::db::run_migrations(&pool).await?;

    println!("✓ Database migrations completed");

    Ok(())
}

pub async fn handle_db_seed(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config.require_database_url()?).await?;
    let products = PostgresProductRepository::new(pool);

    let inserted = crate::db::seed::seed_catalog(&products).await?;
    if inserted == 0 {
        println!("Products already present, nothing seeded");
    } else {
        tracing::info!(inserted, "Seeded product catalog");
        println!("✓ Seeded {} products", inserted);
    }

    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    println!(
        "  Database URL: {}",
        config
            .database_url
            .as_deref()
            .map(mask_password)
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!("  Gateway URL: {}", config.gateway.base_url);
    println!("  Gateway Public Key: {}", mask_secret(&config.gateway.public_key));
    println!("  Gateway Private Key: {}", mask_secret(&config.gateway.private_key));
    println!(
        "  Gateway Integrity Key: {}",
        config
            .gateway
            .integrity_key
            .as_deref()
            .map(mask_secret)
            .unwrap_or_else(|| "(not set, charges unsigned)".to_string())
    );
    println!("  Request Timeout: {:?}", config.gateway.request_timeout);
    println!(
        "  Polling: every {:?} for up to {:?}",
        config.gateway.polling_interval, config.gateway.polling_timeout
    );
    println!("  Currency: {}", config.gateway.currency);
    println!("  Base Fee: {}", config.fees.base_fee);
    println!("  Delivery Fee: {}", config.fees.delivery_fee);

    crate::startup::validate_env_vars(config)?;

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}

fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            if let Some(slash_pos) = url[..colon_pos].rfind("//") {
                let prefix = &url[..slash_pos + 2];
                let user_start = slash_pos + 2;
                let user = &url[user_start..colon_pos];
                let suffix = &url[at_pos..];
                return format!("{}{}:****{}", prefix, user, suffix);
            }
        }
    }
    url.to_string()
}

/// Keeps the key prefix (`pub_test_`, `prv_prod_`) visible.
fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    match secret.char_indices().filter(|(_, ch)| *ch == '_').nth(1) {
        Some((idx, _)) => format!("{}****", &secret[..=idx]),
        None => "****".to_string(),
    }
}
