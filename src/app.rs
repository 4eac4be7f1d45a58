/*
 * Responsibility
 * - Config 読み込み → 依存生成 (Valkey / PgPool / introspection / licence source) → Router 組み立て
 * - Middleware の適用順: http(外) → cors → token stage → licence stage → route_layer(ロール) → handler
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, v1::handlers::health::health};
use crate::config::Config;
use crate::middleware;
use crate::services::{
    cache::{CacheClient, ValkeyClient},
    clock::{Clock, SystemClock},
    licence::{LicenceVerifier, PgLicenceSource},
    path_policy::PathPolicy,
    token::build_token_verifier,
};
use crate::state::{AppState, GatewayState};

fn init_tracing() {
    // RUST_LOG=info,licence_gateway=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: fail fast
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting licence gateway in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let (state, gateway) = build_state(&config).await?;
    let app = build_app(state, gateway, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<(AppState, GatewayState)> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let cache: Arc<dyn CacheClient> = Arc::new(
        ValkeyClient::new(&config.redis_url, config.cache_timeout)
            .await
            .context("failed to connect to the token cache")?,
    );
    tracing::info!(backend = cache.backend_name(), "token cache connected");

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    let paths = PathPolicy::new(
        config.unprotected_paths.clone(),
        config.unlicensed_paths.clone(),
    )?;
    let tokens = build_token_verifier(config, cache, clock.clone())?;
    let licences = LicenceVerifier::new(Arc::new(PgLicenceSource::new(db.clone())), clock.clone());

    let gateway = GatewayState::new(Arc::new(paths), tokens, Arc::new(licences));
    let state = AppState::new(db, clock, config.admin_roles.clone());

    Ok((state, gateway))
}

/// Routes plus the gateway stages, without the transport layers.
pub fn build_router(state: AppState, gateway: GatewayState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/license/v1", api::v1::routes(&state))
        .with_state(state);

    middleware::auth::apply(router, gateway)
}

pub fn build_app(state: AppState, gateway: GatewayState, config: &Config) -> Router {
    let router = build_router(state, gateway);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config.request_timeout)
}
