use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Portfolio store unavailable: {0}")]
    StoreDegraded(String),
}

impl AppError {
    /// Maps a store miss to a 404 that names what was missing.
    pub fn not_found(what: &str) -> impl FnOnce(DbError) -> AppError + '_ {
        move |e| match e {
            DbError::NotFound => AppError::NotFound(format!("{what} not found")),
            other => AppError::Database(other),
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
///
/// The body is always `{"detail": "<message>"}`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::Database(DbError::DuplicateEntry) => {
                (StatusCode::BAD_REQUEST, DbError::DuplicateEntry.to_string())
            }
            AppError::Database(DbError::NotFound) => {
                (StatusCode::NOT_FOUND, "Not found".to_string())
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Analytics(analytics::AnalyticsError::InvalidInput(message)) => {
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Analytics(analytics::AnalyticsError::DataUnavailable(code)) => (
                StatusCode::NOT_FOUND,
                format!("No valuation data available for {code}"),
            ),
            AppError::Task(join_err) => {
                tracing::error!(error = ?join_err, "Background task error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred during analysis".to_string(),
                )
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::StoreDegraded(reason) => {
                tracing::warn!(reason = %reason, "Rejected request while the store is degraded.");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Portfolio store is unavailable".to_string(),
                )
            }
        };

        let body = Json(json!({ "detail": detail }));
        (status, body).into_response()
    }
}
