use crate::core::predictor::PredictionService;
use crate::domain::model::{ModelCompany, PredictionRequest, PredictionResult};
use crate::utils::error::{ServiceError, PREDICTION_SUGGESTION};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

pub type AppState = Arc<PredictionService>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub categories_loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub companies: Vec<String>,
    pub models: Vec<ModelCompany>,
    pub fuel_types: Vec<String>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match &self {
            ServiceError::NotReady { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "detail": self.to_string() })),
            )
                .into_response(),
            ServiceError::Validation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "detail": {
                        "field": e.field(),
                        "value": e.rejected_value(),
                        "message": e.to_string(),
                    }
                })),
            )
                .into_response(),
            ServiceError::Prediction { details } => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "detail": {
                        "error": "Prediction failed",
                        "details": details,
                        "suggestion": PREDICTION_SUGGESTION,
                    }
                })),
            )
                .into_response(),
            _ => {
                tracing::error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": self.user_friendly_message() })),
                )
                    .into_response()
            }
        }
    }
}

/// 健康檢查, 只回報狀態, 不會失敗
///
/// 類別檔與 `/categories` 走同一個載入路徑, 啟動後才部署的檔案也會被讀到。
pub async fn health_check(State(service): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_loaded: service.model().is_loaded(),
        categories_loaded: !service.categories().current().is_empty(),
    })
}

pub async fn get_categories(State(service): State<AppState>) -> Result<Json<CategoryResponse>, ServiceError> {
    let set = service.categories().current();
    if set.is_empty() {
        return Err(ServiceError::not_ready("Category information"));
    }

    Ok(Json(CategoryResponse {
        companies: set.companies.clone(),
        models: set.model_company_pairs.clone(),
        fuel_types: set.fuel_types.clone(),
    }))
}

pub async fn predict_price(
    State(service): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("Malformed prediction request: {}", rejection.body_text());
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "detail": {
                        "field": null,
                        "value": null,
                        "message": rejection.body_text(),
                    }
                })),
            )
                .into_response();
        }
    };

    let outcome =
        tokio::task::spawn_blocking(move || service.predict_price(request)).await;

    match outcome {
        Ok(Ok(result)) => Json::<PredictionResult>(result).into_response(),
        Ok(Err(e)) => e.into_response(),
        Err(join_error) => {
            tracing::error!("Prediction task aborted: {}", join_error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "Prediction task aborted" })),
            )
                .into_response()
        }
    }
}
