use thiserror::Error;

/// 輸入驗證錯誤 (欄位層級)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid {field}: '{value}'. Must be one of: {options}")]
    UnknownCategory {
        field: String,
        value: String,
        options: String,
    },

    #[error("Invalid {field}: {value}. Must be between {min} and {max}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            ValidationError::UnknownCategory { field, .. } => field,
            ValidationError::OutOfRange { field, .. } => field,
        }
    }

    pub fn rejected_value(&self) -> serde_json::Value {
        match self {
            ValidationError::UnknownCategory { value, .. } => {
                serde_json::Value::String(value.clone())
            }
            ValidationError::OutOfRange { value, .. } => serde_json::Value::from(*value),
        }
    }
}

pub const PREDICTION_SUGGESTION: &str =
    "Please check that the input data matches the expected format and categories.";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{component} is not loaded. Please try again later.")]
    NotReady { component: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Prediction failed: {details}")]
    Prediction { details: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Category file error ({path}): {message}")]
    CategoryFile { path: String, message: String },

    #[error("Model artifact error ({path}): {message}")]
    ModelArtifact { path: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Readiness,
    Input,
    Inference,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ServiceError {
    pub fn prediction(details: impl Into<String>) -> Self {
        ServiceError::Prediction {
            details: details.into(),
        }
    }

    pub fn not_ready(component: impl Into<String>) -> Self {
        ServiceError::NotReady {
            component: component.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ServiceError::NotReady { .. } => ErrorCategory::Readiness,
            ServiceError::Validation(_) => ErrorCategory::Input,
            ServiceError::Prediction { .. } => ErrorCategory::Inference,
            ServiceError::IoError(_)
            | ServiceError::SerializationError(_)
            | ServiceError::CsvError(_)
            | ServiceError::CategoryFile { .. }
            | ServiceError::ModelArtifact { .. } => ErrorCategory::Data,
            ServiceError::ConfigError { .. }
            | ServiceError::ConfigValidationError { .. }
            | ServiceError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Readiness | ErrorCategory::Inference => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ServiceError::NotReady { .. } => {
                "Deploy the missing artifact next to the service and retry".to_string()
            }
            ServiceError::Validation(_) => {
                "Use GET /categories to list the accepted values".to_string()
            }
            ServiceError::Prediction { .. } => PREDICTION_SUGGESTION.to_string(),
            ServiceError::CategoryFile { .. } => {
                "Regenerate the category file with the gencat tool".to_string()
            }
            ServiceError::ModelArtifact { .. } => {
                "Re-export the model artifact from the training pipeline".to_string()
            }
            ServiceError::IoError(_) => "Check file paths and permissions".to_string(),
            ServiceError::SerializationError(_) | ServiceError::CsvError(_) => {
                "Check that the input file is well-formed".to_string()
            }
            ServiceError::ConfigError { .. }
            | ServiceError::ConfigValidationError { .. }
            | ServiceError::InvalidConfigValueError { .. } => {
                "Review the TOML configuration and CLI flags".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ServiceError::NotReady { component } => {
                format!("The {} is not available yet", component)
            }
            ServiceError::Validation(e) => e.to_string(),
            ServiceError::Prediction { .. } => "The model could not price this car".to_string(),
            ServiceError::CategoryFile { path, .. } => {
                format!("Category file '{}' could not be read", path)
            }
            ServiceError::ModelArtifact { path, .. } => {
                format!("Model artifact '{}' could not be loaded", path)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
