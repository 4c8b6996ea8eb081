//! HTTP API для оценки аренды

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::error::RentError;
use crate::pipeline::RentEstimator;
use crate::types::{FilterOptions, PredictionResponse, RentRequest};

#[derive(Clone)]
pub struct AppState {
    estimator: Arc<RentEstimator>,
    /// Сообщение для пользователя, если датасет не загрузился
    dataset_error: Option<String>,
}

impl AppState {
    pub fn new(estimator: RentEstimator, dataset_error: Option<String>) -> Self {
        Self {
            estimator: Arc::new(estimator),
            dataset_error,
        }
    }
}

pub struct ApiError(RentError);

impl From<RentError> for ApiError {
    fn from(err: RentError) -> Self {
        ApiError(err)
    }
}

// Тело не разобралось в RentRequest: тот же JSON-ответ 400, что и у validate
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(RentError::invalid("body", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            RentError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, self.0.to_string()),
            RentError::DatasetUnavailable(_) | RentError::DataUnavailable(_) => {
                tracing::error!(detail = %self.0, "Data unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, self.0.to_string())
            }
            RentError::DimensionMismatch { .. } => {
                tracing::error!(detail = %self.0, "Encoder and training split are out of sync");
                (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string())
            }
            RentError::Preprocessing(_) | RentError::Model(_) => {
                tracing::error!(detail = %self.0, "Prediction failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Prediction failed. Check server logs for details.".to_string())
            }
        };

        let field = match &self.0 {
            RentError::InvalidInput { field, .. } => Some(*field),
            _ => None,
        };

        let body = Json(json!({
            "error": true,
            "message": message,
            "field": field,
        }));

        (status, body).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/options", get(options))
        .route("/api/predict", post(predict))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Rent ML API (Rust)",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn options(State(state): State<AppState>) -> Json<FilterOptions> {
    Json(state.estimator.dataset().filter_options())
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<RentRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(request) = payload?;
    tracing::info!(
        "Predict request: {:?} / {:?}, {:?} m2",
        request.neighborhood,
        request.property_type,
        request.area_util
    );

    if let Some(message) = &state.dataset_error {
        return Err(RentError::DatasetUnavailable(message.clone()).into());
    }

    // Обучение 200 деревьев - в блокирующем пуле, запрос независим от остальных
    let estimator = state.estimator.clone();
    let response = tokio::task::spawn_blocking(move || estimator.estimate(&request))
        .await
        .map_err(|e| RentError::Preprocessing(format!("prediction task failed: {}", e)))??;

    Ok(Json(response))
}
