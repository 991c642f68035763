use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use checkout_core::adapters::InMemoryRepositories;
use checkout_core::cli::{self, Cli, Commands, DbCommands};
use checkout_core::config::{Config, LogFormat};
use checkout_core::gateway::WompiClient;
use checkout_core::health::{GatewayChecker, PostgresChecker};
use checkout_core::middleware::request_logger::RequestLogging;
use checkout_core::{create_app, db, startup, AppState, Repositories};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Db(DbCommands::Migrate)) => cli::handle_db_migrate(&config).await,
        Some(Commands::Db(DbCommands::Seed)) => cli::handle_db_seed(&config).await,
        Some(Commands::Config) => cli::handle_config_validate(&config),
        Some(Commands::Serve { in_memory }) => serve(config, in_memory).await,
        None => serve(config, false).await,
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn serve(config: Config, in_memory: bool) -> anyhow::Result<()> {
    let fees = config.fees.schedule()?;
    let gateway = Arc::new(WompiClient::new(&config.gateway));

    let (repositories, pool) = if in_memory {
        let repos = InMemoryRepositories::new();
        let seeded = db::seed::seed_catalog(&repos.products).await?;
        tracing::info!(seeded, "Using in-memory repositories");
        (Repositories::from(repos), None)
    } else {
        let pool = db::create_pool(config.require_database_url()?).await?;
        db::run_migrations(&pool).await?;
        (Repositories::postgres(pool.clone()), Some(pool))
    };

    let report = startup::validate_environment(&config, pool.as_ref(), &gateway).await;
    report.print();
    if !report.environment {
        anyhow::bail!("Invalid configuration, refusing to start");
    }
    if !report.is_valid() {
        tracing::warn!("Starting with failing dependency checks");
    }

    let mut state = AppState::new(
        repositories,
        gateway.clone(),
        fees,
        config.gateway.polling_policy(),
        config.gateway.currency.clone(),
    )
    .with_health_checker(Arc::new(GatewayChecker::new(gateway)))
    .with_request_logging(RequestLogging {
        log_body: config.log_request_body,
    });
    if let Some(pool) = pool {
        state = state.with_health_checker(Arc::new(PostgresChecker::new(pool)));
    }

    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
