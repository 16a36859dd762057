use api_client::error::ApiError;
use api_client::{SchemeMeta, ValuationSource};
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use configuration::Config;
use core_types::{RawNavRecord, RawNavValue};
use database::{DbError, NewPortfolioItem, PortfolioItem, PortfolioStore, UserProfile};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;
use web_server::{AppState, StoreHandle, build_router};

/// A source with a handful of fixed histories.
struct FixedSource {
    histories: HashMap<String, Vec<RawNavRecord>>,
}

impl FixedSource {
    fn new() -> Self {
        let mut histories = HashMap::new();
        histories.insert(
            "118550".to_string(),
            vec![
                RawNavRecord::new("02-01-2024", "100.0"),
                RawNavRecord::new("03-01-2024", "101.0"),
                RawNavRecord::new("04-01-2024", "100.5"),
                RawNavRecord {
                    date: "05-01-2024".to_string(),
                    value: RawNavValue::Other(Value::Null),
                },
                RawNavRecord::new("01-02-2024", "102.0"),
                RawNavRecord::new("02-02-2024", "103.5"),
            ],
        );
        histories.insert(
            "120503".to_string(),
            vec![
                RawNavRecord::new("03-01-2024", "50.0"),
                RawNavRecord::new("04-01-2024", "51.0"),
            ],
        );
        histories.insert(
            "single".to_string(),
            vec![RawNavRecord::new("03-01-2024", "10.0")],
        );
        Self { histories }
    }
}

#[async_trait]
impl ValuationSource for FixedSource {
    async fn list_schemes(&self) -> Result<BTreeMap<String, String>, ApiError> {
        Ok(BTreeMap::from([
            ("118550".to_string(), "Example Flexi Cap Fund".to_string()),
            ("120503".to_string(), "Example Liquid Fund".to_string()),
        ]))
    }

    async fn scheme_meta(&self, scheme_code: &str) -> Result<SchemeMeta, ApiError> {
        Ok(SchemeMeta {
            scheme_name: Some(format!("Scheme {scheme_code}")),
            ..SchemeMeta::default()
        })
    }

    async fn historical_nav(&self, scheme_code: &str) -> Result<Vec<RawNavRecord>, ApiError> {
        Ok(self.histories.get(scheme_code).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct MemoryStore {
    items: Mutex<Vec<PortfolioItem>>,
    users: Mutex<HashMap<String, UserProfile>>,
}

#[async_trait]
impl PortfolioStore for MemoryStore {
    async fn add_item(&self, item: NewPortfolioItem) -> Result<PortfolioItem, DbError> {
        let mut items = self.items.lock().unwrap();
        let duplicate = items.iter().any(|i| {
            i.user_id == item.user_id && i.item_type == item.item_type && i.item_id == item.item_id
        });
        if duplicate {
            return Err(DbError::DuplicateEntry);
        }
        let row = PortfolioItem {
            id: Uuid::new_v4(),
            user_id: item.user_id,
            item_type: item.item_type,
            item_id: item.item_id,
            name: item.name,
            added_at: Utc::now(),
        };
        items.push(row.clone());
        Ok(row)
    }

    async fn remove_item(&self, user_id: &str, item_id: &str) -> Result<(), DbError> {
        let mut items = self.items.lock().unwrap();
        let index = items
            .iter()
            .position(|i| i.user_id == user_id && i.item_id == item_id)
            .ok_or(DbError::NotFound)?;
        items.remove(index);
        Ok(())
    }

    async fn list_items(&self, user_id: &str) -> Result<Vec<PortfolioItem>, DbError> {
        let items = self.items.lock().unwrap();
        Ok(items.iter().filter(|i| i.user_id == user_id).cloned().collect())
    }

    async fn save_user(&self, profile: &UserProfile) -> Result<u64, DbError> {
        self.users
            .lock()
            .unwrap()
            .insert(profile.user_id.clone(), profile.clone());
        Ok(1)
    }

    async fn get_user(&self, user_id: &str) -> Result<UserProfile, DbError> {
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or(DbError::NotFound)
    }

    async fn health_check(&self) -> Result<(), DbError> {
        Ok(())
    }
}

fn app_with(store: StoreHandle) -> Router {
    let mut config = Config::default();
    config.analytics.seed = Some(7);
    config.analytics.num_simulations = 200;
    config.analytics.horizon_days = 20;
    let state = AppState::from_config(&config, Arc::new(FixedSource::new()), store);
    build_router(Arc::new(state))
}

fn app() -> Router {
    app_with(StoreHandle::Ready(Arc::new(MemoryStore::default())))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn health_reports_store_state() {
    let (status, body) = get(&app(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "store": "ok" }));

    let degraded = app_with(StoreHandle::Degraded("connection refused".to_string()));
    let (_, body) = get(&degraded, "/api/health").await;
    assert_eq!(body["store"], "degraded");
}

#[tokio::test]
async fn degraded_store_rejects_portfolio_routes_but_serves_analytics() {
    let app = app_with(StoreHandle::Degraded("connection refused".to_string()));

    let (status, body) = get(&app, "/api/get-portfolio/user-1").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["detail"].is_string());

    let (status, _) = get(&app, "/api/mutual/risk-volatility/118550").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn scheme_directory_supports_search() {
    let app = app();
    let (status, body) = get(&app, "/api/mutual/schemes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_object().unwrap().len(), 2);

    let (_, body) = get(&app, "/api/mutual/schemes?search=LIQUID").await;
    assert_eq!(body, json!({ "120503": "Example Liquid Fund" }));
}

#[tokio::test]
async fn historical_nav_passes_records_through() {
    let (status, body) = get(&app(), "/api/mutual/historical-nav/120503").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "date": "03-01-2024", "nav": "50.0" },
            { "date": "04-01-2024", "nav": "51.0" },
        ])
    );

    let (_, body) = get(&app(), "/api/mutual/historical-nav/unknown").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn risk_route_reports_dated_returns() {
    let (status, body) = get(&app(), "/api/mutual/risk-volatility/120503").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["returns"], json!([{ "date": "2024-01-04", "returns": 0.02 }]));
    assert_eq!(body["annualized_volatility"], 0.0);

    let (_, empty) = get(&app(), "/api/mutual/risk-volatility/unknown").await;
    assert_eq!(empty["returns"], json!([]));
    assert_eq!(empty["sharpe_ratio"], 0.0);
}

#[tokio::test]
async fn heatmap_route_labels_months_as_strings() {
    let (status, body) = get(&app(), "/api/mutual/performance-heatmap/118550").await;
    assert_eq!(status, StatusCode::OK);
    let months: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["month"].as_str().unwrap())
        .collect();
    assert_eq!(months, vec!["1", "2"]);
}

#[tokio::test]
async fn max_drawdown_route_measures_from_the_peak() {
    let (status, body) = get(&app(), "/api/mutual/max-drawdown/118550").await;
    assert_eq!(status, StatusCode::OK);
    let drawdown = body["max_drawdown"].as_f64().unwrap();
    assert!((drawdown - (100.5 / 101.0 - 1.0)).abs() < 1e-12);

    let (_, empty) = get(&app(), "/api/mutual/max-drawdown/unknown").await;
    assert_eq!(empty, json!({ "max_drawdown": 0.0 }));
}

#[tokio::test]
async fn rolling_volatility_route_honours_the_window() {
    let app = app();
    let (status, body) = get(&app, "/api/mutual/rolling-volatility/118550?window=2").await;
    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[0]["date"], "2024-01-04");
    assert!(points[0]["rolling_volatility"].as_f64().unwrap() > 0.0);

    let (status, body) = get(&app, "/api/mutual/rolling-volatility/118550").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = get(&app, "/api/mutual/rolling-volatility/118550?window=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("window"));
}

#[tokio::test]
async fn monte_carlo_is_reproducible_with_a_seed() {
    let app = app();
    let uri = "/api/mutual/monte-carlo-prediction/118550?num_simulations=300&days=15&seed=99";
    let (status, first) = get(&app, uri).await;
    let (_, second) = get(&app, uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(first["last_nav"], 103.5);
    assert!(first["expected_nav"].is_number());
    assert!(first["probability_positive_return"].is_number());
}

#[tokio::test]
async fn monte_carlo_reports_missing_data_and_rejects_bad_params() {
    let app = app();
    let (status, body) = get(&app, "/api/mutual/monte-carlo-prediction/single").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Insufficient data for Monte Carlo simulation" }));

    let (status, body) = get(&app, "/api/mutual/monte-carlo-prediction/unknown").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "No NAV data" }));

    let (status, body) =
        get(&app, "/api/mutual/monte-carlo-prediction/118550?num_simulations=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("num_simulations"));
}

#[tokio::test]
async fn compare_aligns_on_the_union_of_dates() {
    let app = app();
    let (status, body) =
        get(&app, "/api/mutual/compare-navs?scheme_codes=120503,unknown,single").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "date": "2024-01-03", "values": { "120503": 50.0, "single": 10.0 } },
            { "date": "2024-01-04", "values": { "120503": 51.0, "single": null } },
        ])
    );

    let (status, body) = get(&app, "/api/mutual/compare-navs?scheme_codes=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn average_aum_is_empty() {
    let (status, body) = get(&app(), "/api/mutual/average-aum").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn portfolio_lifecycle() {
    let app = app();
    let item = json!({
        "user_id": "user-1",
        "item_type": "mutual_fund",
        "item_id": "120503",
        "name": "Example Liquid Fund",
    });

    let (status, added) = post_json(&app, "/api/add-to-portfolio", item.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(added["item_id"], "120503");
    assert!(added["id"].is_string());

    let (status, body) = post_json(&app, "/api/add-to-portfolio", item).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": "Item already in portfolio" }));

    let (_, listed) = get(&app, "/api/get-portfolio/user-1").await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = delete(&app, "/api/remove-from-portfolio/user-1/120503").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = delete(&app, "/api/remove-from-portfolio/user-1/120503").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Item not found" }));
}

#[tokio::test]
async fn remove_from_portfolio_deletes_a_single_entry() {
    let app = app();
    for item_type in ["mutual_fund", "watchlist"] {
        let (status, _) = post_json(
            &app,
            "/api/add-to-portfolio",
            json!({
                "user_id": "user-4",
                "item_type": item_type,
                "item_id": "120503",
                "name": "L",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = delete(&app, "/api/remove-from-portfolio/user-4/120503").await;
    assert_eq!(status, StatusCode::OK);
    let (_, listed) = get(&app, "/api/get-portfolio/user-4").await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = delete(&app, "/api/remove-from-portfolio/user-4/120503").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = delete(&app, "/api/remove-from-portfolio/user-4/120503").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_to_portfolio_requires_every_field() {
    let (status, body) = post_json(
        &app(),
        "/api/add-to-portfolio",
        json!({ "user_id": "user-1", "item_type": "stock", "item_id": " ", "name": "X" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": "item_id is required" }));
}

#[tokio::test]
async fn portfolio_summary_covers_every_holding() {
    let app = app();
    for (item_type, item_id, name) in [
        ("mutual_fund", "120503", "Example Liquid Fund"),
        ("stock", "INFY", "Infosys"),
    ] {
        let (status, _) = post_json(
            &app,
            "/api/add-to-portfolio",
            json!({
                "user_id": "user-2",
                "item_type": item_type,
                "item_id": item_id,
                "name": name,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get(&app, "/api/portfolio-summary/user-2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_latest_nav"], 51.0);

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["latest_nav"], 51.0);
    assert_eq!(items[0]["monte_carlo"], "N/A");
    assert!(items[0]["risk_volatility"]["sharpe_ratio"].is_number());
    assert_eq!(
        items[1],
        json!({
            "name": "Infosys",
            "type": "stock",
            "latest_nav": "N/A",
            "one_year_growth": "N/A",
            "monte_carlo": "N/A",
            "risk_volatility": "N/A",
        })
    );

    let (_, empty) = get(&app, "/api/portfolio-summary/nobody").await;
    assert_eq!(empty, json!({ "items": [], "total_latest_nav": 0.0 }));
}

#[tokio::test]
async fn users_are_saved_and_looked_up() {
    let app = app();
    let (status, body) =
        post_json(&app, "/api/save-user", json!({ "email": "a@example.test" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": "User ID (sub) is required" }));

    let (status, _) = post_json(
        &app,
        "/api/save-user",
        json!({ "sub": "user-3", "email": "a@example.test", "name": "A" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, user) = get(&app, "/api/get-user/user-3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "a@example.test");
    assert!(user["last_login"].is_string());

    let (status, body) = get(&app, "/api/get-user/user-404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "User not found" }));
}

#[tokio::test]
async fn save_user_records_profile_update_time_as_last_login() {
    let app = app();
    let (status, _) = post_json(
        &app,
        "/api/save-user",
        json!({ "sub": "user-5", "updated_at": "2024-03-01T10:00:00.000Z" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, user) = get(&app, "/api/get-user/user-5").await;
    assert_eq!(user["last_login"], "2024-03-01T10:00:00.000Z");
}
