//! Entry point for the Emotional Value Core HTTP server.
//!
//! Boots telemetry, loads configuration, opens the persistence backend, and
//! publishes the Axum router with rate limiting, compression, and an
//! optionally-restricted CORS policy.

mod api;
mod auth;
mod config;
mod error;
mod middleware;
mod orchestrator;
mod prompt;
mod export;
mod state;

use std::{net::SocketAddr, num::NonZeroU32, time::Duration};

use axum::Router;
use middleware::rate_limit::RateLimitLayer;
use state::AppState;
use tokio::net::TcpListener;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    info!("starting Emotional Value Core server");

    let config = config::Config::from_env()?;
    let state = AppState::new(&config).await?;

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or_else(|| config.port());
    let host = std::env::var("HOST").unwrap_or_else(|_| config.host().to_string());
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    let openapi = api::openapi::ApiDoc::openapi();

    let rate_limit = NonZeroU32::new(config.rate_limit_requests_per_minute())
        .expect("rate limit requests must be greater than zero");
    let rate_period = Duration::from_secs(60);

    let cors = match state.frontend_origin() {
        Some(origin) => {
            let origin = origin
                .parse()
                .expect("FRONTEND_ORIGIN must be a valid header value");
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
        }
        None => CorsLayer::permissive(),
    };

    let app = Router::new()
        .merge(api::routes::all_routes())
        .merge(utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(RateLimitLayer::new(rate_limit, rate_period))
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    info!(address = %listener.local_addr()?, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("evc_server=info,tower_http=info"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_level(true);

    let registry = Registry::default().with(env_filter).with(fmt_layer);

    tracing::subscriber::set_global_default(registry)
        .expect("failed to initialize tracing subscriber");
}
