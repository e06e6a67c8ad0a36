use acb_ledger::orchestration::Calculator;
use acb_ledger::rates::{CachedRateOracle, CryptoCompareOracle, RateOracle};
use acb_ledger::{api, config::Config, db::init_db, Repository};
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("Configuration error")?;
    let port = config.port;

    let pool = init_db(&config.database_path)
        .await
        .with_context(|| format!("Failed to initialize database at {}", config.database_path))?;
    let repo = Arc::new(Repository::new(pool));

    let ttl_ms = i64::try_from(config.rate_cache_ttl.as_millis()).unwrap_or(i64::MAX);
    let cutoff = chrono::Utc::now().timestamp_millis().saturating_sub(ttl_ms);
    let purged = repo
        .purge_stale_rates(cutoff)
        .await
        .context("Failed to purge stale rates")?;
    if purged > 0 {
        tracing::info!("Purged {} stale cached rates", purged);
    }

    let upstream: Arc<dyn RateOracle> =
        Arc::new(CryptoCompareOracle::new(config.rate_api_url.clone()));
    let oracle: Arc<dyn RateOracle> = Arc::new(CachedRateOracle::new(
        upstream,
        repo.clone(),
        config.rate_cache_ttl,
    ));
    let calculator = Arc::new(Calculator::new(oracle, config.ledger_mode));

    let app = api::create_router(api::AppState::new(calculator, repo, config));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
