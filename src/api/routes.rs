use crate::api::handlers::{get_categories, health_check, predict_price, AppState};
use crate::core::category_store::CategoryStore;
use crate::core::model_handle::ModelHandle;
use crate::core::predictor::PredictionService;
use crate::core::validator::InputValidator;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

pub fn build_service<C: ConfigProvider>(config: &C) -> PredictionService {
    PredictionService::new(
        CategoryStore::new(config.categories_path()),
        ModelHandle::new(config.model_path()),
        InputValidator::new(config.alternatives_limit()),
    )
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/categories", get(get_categories))
        .route("/predict", post(predict_price))
        .with_state(state)
}

pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("🚀 Listening on http://{}", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
