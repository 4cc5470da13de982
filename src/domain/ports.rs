use crate::domain::model::FeatureRow;
use crate::utils::error::Result;

/// 已訓練好的價格模型, 視為黑盒
pub trait Regressor: Send + Sync {
    fn predict(&self, row: &FeatureRow) -> Result<f64>;
}

pub trait ConfigProvider: Send + Sync {
    fn bind_address(&self) -> String;
    fn categories_path(&self) -> &str;
    fn model_path(&self) -> &str;
    fn alternatives_limit(&self) -> usize;
}
