use crate::{AppState, error::AppError};
use analytics::{
    AnalyticsError, ComparisonRow, DEFAULT_ROLLING_WINDOW, HeatmapEntry, RiskMetrics,
    RollingVolatilityPoint, SimulationOutcome, SimulationParams,
};
use api_client::SchemeMeta;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use core_types::{Holding, RawNavRecord, ValuationSeries};
use database::{NewPortfolioItem, PortfolioItem, UserProfile};
use portfolio::PortfolioSummary;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Largest `num_simulations` a single request may ask for.
const MAX_SIMULATIONS: usize = 100_000;
/// Largest horizon, in trading days, a single request may ask for.
const MAX_HORIZON_DAYS: usize = 10 * 252;

/// # GET /
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Navscope API is running" }))
}

/// # GET /api/health
/// A connected store is health-checked on every call; a failed check reports it as degraded.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let store = match state.store.get() {
        Ok(store) => match store.health_check().await {
            Ok(()) => "ok",
            Err(e) => {
                tracing::warn!(error = %e, "Portfolio store health check failed.");
                "degraded"
            }
        },
        Err(_) => state.store.status(),
    };
    Json(json!({ "status": "ok", "store": store }))
}

// --- Mutual fund analytics ---

/// Fetches a scheme's raw history. Source failures degrade to an empty history.
async fn fetch_records(state: &AppState, scheme_code: &str) -> Vec<RawNavRecord> {
    match state.source.historical_nav(scheme_code).await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(
                scheme_code,
                error = %e,
                "Valuation source failed; treating history as empty."
            );
            Vec::new()
        }
    }
}

async fn fetch_series(state: &AppState, scheme_code: &str) -> ValuationSeries {
    let records = fetch_records(state, scheme_code).await;
    state.engine.normalize(&records)
}

#[derive(Debug, Deserialize)]
pub struct SchemeSearch {
    search: Option<String>,
}

/// # GET /api/mutual/schemes?search=
pub async fn list_schemes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SchemeSearch>,
) -> Json<BTreeMap<String, String>> {
    let result = match query.search.as_deref() {
        Some(search) => state.source.search_schemes(search).await,
        None => state.source.list_schemes().await,
    };
    Json(result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to fetch the scheme directory.");
        BTreeMap::new()
    }))
}

/// # GET /api/mutual/scheme-details/:scheme_code
pub async fn scheme_details(
    Path(scheme_code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<SchemeMeta> {
    Json(state.source.scheme_meta(&scheme_code).await.unwrap_or_else(|e| {
        tracing::warn!(scheme_code = %scheme_code, error = %e, "Failed to fetch scheme details.");
        SchemeMeta::default()
    }))
}

/// # GET /api/mutual/historical-nav/:scheme_code
/// Returns the records exactly as the source supplied them.
pub async fn historical_nav(
    Path(scheme_code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<Vec<RawNavRecord>> {
    Json(fetch_records(&state, &scheme_code).await)
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    scheme_codes: Option<String>,
}

/// Splits a comma-separated identifier list, dropping blanks and repeats.
fn parse_scheme_codes(raw: Option<&str>) -> Result<Vec<String>, AnalyticsError> {
    let mut codes: Vec<String> = Vec::new();
    for code in raw.unwrap_or_default().split(',').map(str::trim) {
        if !code.is_empty() && !codes.iter().any(|c| c == code) {
            codes.push(code.to_string());
        }
    }
    if codes.is_empty() {
        return Err(AnalyticsError::InvalidInput(
            "scheme_codes must list at least one scheme code".to_string(),
        ));
    }
    Ok(codes)
}

/// # GET /api/mutual/compare-navs?scheme_codes=a,b
/// Schemes with no usable history are left out of the comparison.
pub async fn compare_navs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<Vec<ComparisonRow>>, AppError> {
    let codes = parse_scheme_codes(query.scheme_codes.as_deref())?;

    let fetches = codes.iter().map(|code| fetch_series(&state, code));
    let histories = futures::future::join_all(fetches).await;

    let series: BTreeMap<String, ValuationSeries> = codes
        .into_iter()
        .zip(histories)
        .filter(|(_, series)| !series.is_empty())
        .collect();

    Ok(Json(state.engine.compare(&series)))
}

/// # GET /api/mutual/average-aum
/// The source carries no AUM data; the route is kept for existing clients.
pub async fn average_aum() -> Json<Vec<Value>> {
    Json(Vec::new())
}

/// # GET /api/mutual/performance-heatmap/:scheme_code
pub async fn performance_heatmap(
    Path(scheme_code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<Vec<HeatmapEntry>> {
    let series = fetch_series(&state, &scheme_code).await;
    Json(state.engine.heatmap(&series))
}

/// # GET /api/mutual/risk-volatility/:scheme_code
pub async fn risk_volatility(
    Path(scheme_code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<RiskMetrics> {
    let series = fetch_series(&state, &scheme_code).await;
    Json(state.engine.risk_metrics(&series))
}

/// # GET /api/mutual/max-drawdown/:scheme_code
pub async fn max_drawdown(
    Path(scheme_code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<Value> {
    let series = fetch_series(&state, &scheme_code).await;
    Json(json!({ "max_drawdown": state.engine.max_drawdown(&series) }))
}

#[derive(Debug, Deserialize)]
pub struct RollingQuery {
    window: Option<usize>,
}

impl RollingQuery {
    fn window(&self) -> Result<usize, AnalyticsError> {
        let window = self.window.unwrap_or(DEFAULT_ROLLING_WINDOW);
        if !(2..=MAX_HORIZON_DAYS).contains(&window) {
            return Err(AnalyticsError::InvalidInput(format!(
                "window must be between 2 and {MAX_HORIZON_DAYS}"
            )));
        }
        Ok(window)
    }
}

/// # GET /api/mutual/rolling-volatility/:scheme_code?window=
pub async fn rolling_volatility(
    Path(scheme_code): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<RollingQuery>,
) -> Result<Json<Vec<RollingVolatilityPoint>>, AppError> {
    let window = query.window()?;
    let series = fetch_series(&state, &scheme_code).await;
    Ok(Json(state.engine.rolling_volatility(&series, window)))
}

#[derive(Debug, Deserialize)]
pub struct SimulationQuery {
    num_simulations: Option<usize>,
    days: Option<usize>,
    seed: Option<u64>,
}

impl SimulationQuery {
    fn params(&self, defaults: SimulationParams) -> Result<SimulationParams, AnalyticsError> {
        let num_simulations = self.num_simulations.unwrap_or(defaults.num_simulations);
        let days = self.days.unwrap_or(defaults.days);
        if !(1..=MAX_SIMULATIONS).contains(&num_simulations) {
            return Err(AnalyticsError::InvalidInput(format!(
                "num_simulations must be between 1 and {MAX_SIMULATIONS}"
            )));
        }
        if !(1..=MAX_HORIZON_DAYS).contains(&days) {
            return Err(AnalyticsError::InvalidInput(format!(
                "days must be between 1 and {MAX_HORIZON_DAYS}"
            )));
        }
        Ok(SimulationParams {
            num_simulations,
            days,
            ..defaults
        })
    }
}

/// # GET /api/mutual/monte-carlo-prediction/:scheme_code?num_simulations&days&seed
pub async fn monte_carlo_prediction(
    Path(scheme_code): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SimulationQuery>,
) -> Result<Json<SimulationOutcome>, AppError> {
    let params = query.params(state.simulation)?;
    let seed = query.seed.or(state.seed);
    let series = fetch_series(&state, &scheme_code).await;
    let engine = state.engine;

    let outcome = tokio::task::spawn_blocking(move || {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        engine.simulate(&series, &params, &mut rng)
    })
    .await?;

    Ok(Json(outcome))
}

// --- Users and portfolios ---

/// The identity-provider profile posted on login. `sub` is the user id.
#[derive(Debug, Deserialize)]
pub struct UserPayload {
    sub: Option<String>,
    email: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    name: Option<String>,
    picture: Option<String>,
    updated_at: Option<String>,
}

/// # POST /api/save-user
pub async fn save_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UserPayload>,
) -> Result<Json<Value>, AppError> {
    let store = state.store.get()?;
    let user_id = payload
        .sub
        .filter(|sub| !sub.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("User ID (sub) is required".to_string()))?;

    let profile = UserProfile {
        user_id,
        email: payload.email,
        given_name: payload.given_name,
        family_name: payload.family_name,
        name: payload.name,
        picture: payload.picture,
        last_login: payload
            .updated_at
            .or_else(|| Some(chrono::Utc::now().to_rfc3339())),
    };
    store.save_user(&profile).await?;

    tracing::info!(user_id = %profile.user_id, "Saved user profile.");
    Ok(Json(json!({ "message": "User saved successfully", "user_id": profile.user_id })))
}

/// # GET /api/get-user/:user_id
pub async fn get_user(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserProfile>, AppError> {
    let user = state
        .store
        .get()?
        .get_user(&user_id)
        .await
        .map_err(AppError::not_found("User"))?;
    Ok(Json(user))
}

/// # POST /api/add-to-portfolio
pub async fn add_to_portfolio(
    State(state): State<Arc<AppState>>,
    Json(item): Json<NewPortfolioItem>,
) -> Result<Json<PortfolioItem>, AppError> {
    let store = state.store.get()?;
    let required = [
        ("user_id", &item.user_id),
        ("item_type", &item.item_type),
        ("item_id", &item.item_id),
        ("name", &item.name),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }

    let added = store.add_item(item).await?;
    Ok(Json(added))
}

/// # DELETE /api/remove-from-portfolio/:user_id/:item_id
pub async fn remove_from_portfolio(
    Path((user_id, item_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    state
        .store
        .get()?
        .remove_item(&user_id, &item_id)
        .await
        .map_err(AppError::not_found("Item"))?;
    Ok(Json(json!({ "message": "Item removed from portfolio" })))
}

/// # GET /api/get-portfolio/:user_id
pub async fn get_portfolio(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PortfolioItem>>, AppError> {
    let items = state.store.get()?.list_items(&user_id).await?;
    Ok(Json(items))
}

/// # GET /api/portfolio-summary/:user_id
pub async fn portfolio_summary(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PortfolioSummary>, AppError> {
    let items = state.store.get()?.list_items(&user_id).await?;
    let holdings: Vec<Holding> = items.iter().map(PortfolioItem::to_holding).collect();
    Ok(Json(state.summarizer.summarize(&holdings).await))
}
