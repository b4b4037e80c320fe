//! Trendcaster API Gateway
//!
//! The boundary in front of the content core.
//! Handles:
//! - Configuration, logging and metrics bootstrap
//! - Schema provisioning and adapter construction
//! - Request routing and the success/error envelopes

mod handlers;
mod middleware;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{signal, sync::Notify};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use trendcaster_common::{
    config::{AppConfig, ObservabilityConfig},
    db::{ContentStore, DbPool, Repository},
    metrics,
    sources::{
        create_generator, create_news_source, create_social_platform, ContentGenerator,
        NewsSource, SocialPlatform,
    },
    AnalyticsRecorder, ContentPipeline,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ContentStore>,
    pub pipeline: ContentPipeline,
    pub social: Arc<dyn SocialPlatform>,
    pub recorder: AnalyticsRecorder,
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn ContentStore>,
        news: Arc<dyn NewsSource>,
        generator: Arc<dyn ContentGenerator>,
        social: Arc<dyn SocialPlatform>,
    ) -> Self {
        Self {
            config,
            pipeline: ContentPipeline::new(news, generator),
            recorder: AnalyticsRecorder::new(store.clone(), social.clone()),
            store,
            social,
            prometheus: None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    init_tracing(&config.observability)?;
    info!(
        service = %config.observability.service_name,
        "Starting Trendcaster API Gateway v{}",
        trendcaster_common::VERSION
    );

    // Initialize metrics
    let prometheus = if config.observability.metrics_enabled {
        let handle = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("source_duration_seconds".to_string()),
                metrics::SOURCE_LATENCY_BUCKETS,
            )?
            .install_recorder()?;
        metrics::register_metrics();
        Some(handle)
    } else {
        None
    };

    // Initialize database connection
    let db = DbPool::new(&config.database).await?;
    db.provision_schema().await?;
    let store: Arc<dyn ContentStore> = Arc::new(Repository::new(db));

    // Source adapters; a live provider without credentials stops startup here
    let news = create_news_source(&config.news)?;
    let generator = create_generator(&config.generator)?;
    let social = create_social_platform(&config.social)?;
    info!(
        news = news.source_name(),
        model = generator.model_name(),
        social = social.platform_name(),
        "Source adapters ready"
    );

    let mut state = AppState::new(config.clone(), store, news, generator, social);
    state.prometheus = prometheus;

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let draining = Arc::new(Notify::new());
    let signalled = draining.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        signalled.notify_one();
    });

    let grace = config.shutdown_timeout();
    tokio::select! {
        result = server.into_future() => result?,
        _ = async {
            draining.notified().await;
            tokio::time::sleep(grace).await;
        } => tracing::warn!(grace_secs = grace.as_secs(), "Shutdown grace period elapsed, dropping open connections"),
    }

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
    Ok(())
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let timeout = from_fn_with_state(state.config.request_timeout(), middleware::enforce_timeout);

    // API routes
    let api_routes = Router::new()
        // Trends and ideas
        .route("/tech-trends", get(handlers::ideas::tech_trends))
        .route("/content-ideas", get(handlers::ideas::generate_ideas))
        .route(
            "/ideas",
            get(handlers::ideas::list_ideas).post(handlers::ideas::save_idea),
        )
        // Posts and analytics
        .route(
            "/posts",
            get(handlers::posts::list_posts).post(handlers::posts::create_post),
        )
        .route("/posts/import", post(handlers::posts::import_posts))
        .route("/posts/{id}/analytics", get(handlers::posts::post_analytics))
        .route(
            "/posts/{id}/analytics/snapshot",
            post(handlers::posts::record_snapshot),
        )
        // Tone
        .route("/enhance-content", post(handlers::content::enhance_content))
        // Speculation
        .route("/companies", get(handlers::speculation::list_companies))
        .route("/topics/{company}", get(handlers::speculation::list_topics))
        .route("/speculate", post(handlers::speculation::speculate))
        .route("/speculations", get(handlers::speculation::list_speculations))
        // Social platform passthrough
        .route("/instagram/media", get(handlers::instagram::list_media))
        .route(
            "/instagram/media/{id}/insights",
            get(handlers::instagram::media_insights),
        );

    // Compose the app
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/metrics", get(handlers::health::metrics))
        .nest("/api", api_routes)
        .route_layer(from_fn(middleware::track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(timeout)
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
