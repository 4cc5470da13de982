use crate::core::category_store::CategoryStore;
use crate::core::model_handle::ModelHandle;
use crate::core::validator::InputValidator;
use crate::domain::model::{FeatureRow, PredictionRequest, PredictionResult};
use crate::utils::error::{Result, ServiceError};

/// 負值截為 0 後四捨五入到小數點後兩位
pub fn finalize_price(raw: f64) -> Result<f64> {
    if !raw.is_finite() {
        return Err(ServiceError::prediction(format!(
            "model returned a non-finite value ({})",
            raw
        )));
    }
    let clamped = raw.max(0.0);
    let scaled = clamped * 100.0;
    // 極大值放大後溢位, 此時已無小數位可捨入
    if !scaled.is_finite() {
        return Ok(clamped);
    }
    Ok(scaled.round() / 100.0)
}

pub struct PredictionService {
    categories: CategoryStore,
    model: ModelHandle,
    validator: InputValidator,
}

impl PredictionService {
    pub fn new(categories: CategoryStore, model: ModelHandle, validator: InputValidator) -> Self {
        Self {
            categories,
            model,
            validator,
        }
    }

    pub fn categories(&self) -> &CategoryStore {
        &self.categories
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    /// 啟動時預先載入模型與類別檔, 失敗只記錄不中止
    pub fn warm_up(&self) {
        match self.model.get_model() {
            Ok(Some(_)) => {}
            Ok(None) => tracing::warn!(
                "⚠️ Model artifact {} not found, /predict will answer 503 until it is deployed",
                self.model.path().display()
            ),
            Err(e) => tracing::error!("❌ Failed to load model: {}", e),
        }

        match self.categories.load() {
            Ok(set) if set.is_empty() => tracing::warn!(
                "⚠️ No categories loaded from {}, inputs will not be checked",
                self.categories.path().display()
            ),
            Ok(_) => {}
            Err(e) => tracing::error!("❌ Failed to load categories: {}", e),
        }
    }

    pub fn predict_price(&self, request: PredictionRequest) -> Result<PredictionResult> {
        let model = match self.model.get_model() {
            Ok(Some(model)) => model,
            Ok(None) => return Err(ServiceError::not_ready("Model")),
            Err(e) => {
                tracing::error!("Model unavailable: {}", e);
                return Err(ServiceError::not_ready("Model"));
            }
        };

        let categories = self.categories.current();
        let request = self.validator.validate(request, &categories).map_err(|e| {
            tracing::warn!("Rejected prediction input: {}", e);
            ServiceError::from(e)
        })?;

        let row = FeatureRow::from(request);
        tracing::debug!("Predicting with feature row: {:?}", row);

        let price = model
            .predict(&row)
            .map_err(|e| match e {
                failure @ ServiceError::Prediction { .. } => failure,
                other => ServiceError::prediction(other.to_string()),
            })
            .and_then(finalize_price)
            .map_err(|e| {
                tracing::error!("{}", e);
                e
            })?;

        Ok(PredictionResult::success(price))
    }
}
