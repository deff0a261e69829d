use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use skyfare_api::{
    app,
    middleware::{spawn_sweeper, FixedWindowLimiter, RateLimiter, RedisRateLimiter},
    AppState,
};
use skyfare_store::{app_config::RateLimitBackend, Config, HttpFlightProvider, RedisClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyfare_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Skyfare API on port {}", config.server.port);

    if config.provider.access_token.is_empty() {
        tracing::warn!("Provider access token is not set; searches will be rejected upstream");
    }

    let provider = HttpFlightProvider::new(&config.provider)
        .context("Failed to build provider client")?;

    let rate_limit = &config.rate_limit;
    let limiter: Arc<dyn RateLimiter> = match rate_limit.backend {
        RateLimitBackend::Memory => {
            let limiter = Arc::new(FixedWindowLimiter::new(
                rate_limit.max_requests,
                Duration::from_millis(rate_limit.window_ms),
            ));
            spawn_sweeper(
                limiter.clone(),
                Duration::from_millis(rate_limit.sweep_interval_ms),
            );
            limiter
        }
        RateLimitBackend::Redis => {
            let url = rate_limit
                .redis_url
                .as_deref()
                .context("rate_limit.redis_url is required for the redis backend")?;
            let client = RedisClient::new(url).context("Failed to create Redis client")?;
            Arc::new(RedisRateLimiter::new(
                client,
                rate_limit.max_requests,
                rate_limit.window_ms,
            ))
        }
    };
    tracing::info!(
        backend = ?rate_limit.backend,
        max_requests = rate_limit.max_requests,
        window_ms = rate_limit.window_ms,
        "Rate limiter ready"
    );

    let app_state = AppState {
        provider: Arc::new(provider),
        limiter,
        commission_rate: config.pricing.commission_rate,
        provider_timeout: Duration::from_millis(config.provider.timeout_ms),
        trusted_proxies: config.trusted_proxies().into(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
