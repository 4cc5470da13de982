pub mod category_extract;
pub mod category_store;
pub mod model_handle;
pub mod predictor;
pub mod regressor;
pub mod validator;

pub use crate::domain::model::{
    CategoryField, CategorySet, FeatureRow, PredictionRequest, PredictionResult,
};
pub use crate::domain::ports::{ConfigProvider, Regressor};
pub use crate::utils::error::Result;
