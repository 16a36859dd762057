use analytics::{AnalyticsEngine, SimulationParams};
use api_client::{MfApiClient, ValuationSource};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use configuration::{Config, DatabaseConfig};
use database::{DbRepository, PoolSettings, PortfolioStore};
use portfolio::{PortfolioSummarizer, SummaryOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

use error::AppError;

/// The portfolio store as seen by request handlers.
///
/// The store is connected, migrated and health-checked once at startup. If
/// any of that fails the server still starts, serving analytics routes and
/// answering portfolio routes with 503.
#[derive(Clone)]
pub enum StoreHandle {
    Ready(Arc<dyn PortfolioStore>),
    Degraded(String),
}

impl StoreHandle {
    pub fn get(&self) -> Result<&Arc<dyn PortfolioStore>, AppError> {
        match self {
            StoreHandle::Ready(store) => Ok(store),
            StoreHandle::Degraded(reason) => Err(AppError::StoreDegraded(reason.clone())),
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            StoreHandle::Ready(_) => "ok",
            StoreHandle::Degraded(_) => "degraded",
        }
    }
}

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub engine: AnalyticsEngine,
    pub simulation: SimulationParams,
    /// Fixed generator seed for simulations. `None` seeds from the OS per request.
    pub seed: Option<u64>,
    pub source: Arc<dyn ValuationSource>,
    pub store: StoreHandle,
    pub summarizer: PortfolioSummarizer,
}

impl AppState {
    pub fn from_config(
        config: &Config,
        source: Arc<dyn ValuationSource>,
        store: StoreHandle,
    ) -> Self {
        let engine = AnalyticsEngine::new(
            config.analytics.trading_days_per_year,
            config.analytics.risk_free_rate,
        );
        let simulation = SimulationParams {
            num_simulations: config.analytics.num_simulations,
            days: config.analytics.horizon_days,
            batches: config.analytics.simulation_batches,
        };
        let summarizer = PortfolioSummarizer::new(
            source.clone(),
            engine,
            simulation,
            SummaryOptions {
                max_concurrent_fetches: config.portfolio.max_concurrent_fetches,
                holding_timeout: config.portfolio.holding_timeout,
                seed: config.analytics.seed,
            },
        );

        Self {
            engine,
            simulation,
            seed: config.analytics.seed,
            source,
            store,
            summarizer,
        }
    }
}

/// Connects to the portfolio store, falling back to degraded mode on any failure.
pub async fn open_store(settings: &DatabaseConfig) -> StoreHandle {
    match try_open_store(settings).await {
        Ok(repo) => {
            tracing::info!("Portfolio store connected and migrated.");
            StoreHandle::Ready(Arc::new(repo))
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Portfolio store unavailable; portfolio routes will return 503."
            );
            StoreHandle::Degraded(e.to_string())
        }
    }
}

async fn try_open_store(settings: &DatabaseConfig) -> Result<DbRepository, database::DbError> {
    let url = database::database_url_from_env()?;
    let pool = database::connect(
        &url,
        &PoolSettings {
            max_connections: settings.max_connections,
            acquire_timeout: settings.acquire_timeout,
        },
    )
    .await?;
    database::run_migrations(&pool).await?;
    database::health_check(&pool).await?;
    Ok(DbRepository::new(pool))
}

/// Defines the application routes over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        // --- Mutual fund analytics ---
        .route("/api/mutual/schemes", get(handlers::list_schemes))
        .route(
            "/api/mutual/scheme-details/:scheme_code",
            get(handlers::scheme_details),
        )
        .route(
            "/api/mutual/historical-nav/:scheme_code",
            get(handlers::historical_nav),
        )
        .route("/api/mutual/compare-navs", get(handlers::compare_navs))
        .route("/api/mutual/average-aum", get(handlers::average_aum))
        .route(
            "/api/mutual/performance-heatmap/:scheme_code",
            get(handlers::performance_heatmap),
        )
        .route(
            "/api/mutual/risk-volatility/:scheme_code",
            get(handlers::risk_volatility),
        )
        .route(
            "/api/mutual/max-drawdown/:scheme_code",
            get(handlers::max_drawdown),
        )
        .route(
            "/api/mutual/rolling-volatility/:scheme_code",
            get(handlers::rolling_volatility),
        )
        .route(
            "/api/mutual/monte-carlo-prediction/:scheme_code",
            get(handlers::monte_carlo_prediction),
        )
        // --- Users and portfolios ---
        .route("/api/save-user", post(handlers::save_user))
        .route("/api/get-user/:user_id", get(handlers::get_user))
        .route("/api/add-to-portfolio", post(handlers::add_to_portfolio))
        .route(
            "/api/remove-from-portfolio/:user_id/:item_id",
            delete(handlers::remove_from_portfolio),
        )
        .route("/api/get-portfolio/:user_id", get(handlers::get_portfolio))
        .route(
            "/api/portfolio-summary/:user_id",
            get(handlers::portfolio_summary),
        )
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
}

/// Wires the source and store from configuration and serves until Ctrl-C.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let source = MfApiClient::new(
        &config.valuation_source.base_url,
        config.valuation_source.request_timeout,
    )?;
    let store = open_store(&config.database).await;
    let state = Arc::new(AppState::from_config(&config, Arc::new(source), store));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
    }
}
