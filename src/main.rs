mod app;
mod config;
mod db;
mod errors;
mod external;
mod jobs;
mod logging;
mod models;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::db::pg_store::PgStore;
use crate::external::client::UpstreamClient;
use crate::external::coingecko::CoinGeckoProvider;
use crate::external::investors::InvestorApiProvider;
use crate::external::reddit::RedditProvider;
use crate::logging::LoggingConfig;
use crate::services::scheduler::{JobContext, Scheduler};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let config = Arc::new(Config::from_env());

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let client = UpstreamClient::new(config.http_timeout)?;
    let context = JobContext {
        store: Arc::new(PgStore::new(pool.clone())),
        coingecko: Arc::new(CoinGeckoProvider::new(client.clone())),
        reddit: Arc::new(RedditProvider::new(client.clone(), config.reddit.clone())),
        investors: Arc::new(InvestorApiProvider::new(
            client,
            config.investor_api_url.clone(),
        )),
        config: config.clone(),
    };

    let mut scheduler = Scheduler::new(context);
    scheduler.register(
        "price_refresh",
        config.intervals.prices,
        jobs::price_refresh_job::run,
    );
    scheduler.register(
        "social_trends",
        config.intervals.social,
        jobs::social_trends_job::run,
    );
    scheduler.register(
        "investors",
        config.intervals.investors,
        jobs::investors_job::run,
    );
    scheduler.register(
        "market_filter",
        config.intervals.market_filter,
        jobs::market_filter_job::run,
    );
    scheduler.start();

    let state = AppState {
        pool,
        job_statuses: scheduler.statuses(),
    };
    let app = app::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 cryptoradar backend running at http://{}/", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // In-flight job invocations run to completion before the process exits.
    scheduler.stop().await;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
