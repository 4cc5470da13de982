use crate::core::validator::DEFAULT_ALTERNATIVES_LIMIT;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, ServiceError};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub validation: ValidationConfig,
    pub logging: LoggingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub categories_path: String,
    pub model_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            categories_path: "unique_categories.json".to_string(),
            model_path: "car_price_model.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// 合法選項字串的長度上限, 超過只回報數量
    pub alternatives_limit: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            alternatives_limit: DEFAULT_ALTERNATIVES_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ServiceError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ServiceError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MODEL_PATH}), 未設定的保留原字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ServiceError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_range("server.port", self.server.port, 1, 65535)?;

        validate_path("data.categories_path", &self.data.categories_path)?;
        validate_file_extension("data.categories_path", &self.data.categories_path, &["json"])?;
        validate_path("data.model_path", &self.data.model_path)?;

        validate_positive_number(
            "validation.alternatives_limit",
            self.validation.alternatives_limit,
            1,
        )?;

        if let Some(level) = &self.logging.level {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level.as_str()) {
                return Err(ServiceError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

impl ConfigProvider for ServiceConfig {
    fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn categories_path(&self) -> &str {
        &self.data.categories_path
    }

    fn model_path(&self) -> &str {
        &self.data.model_path
    }

    fn alternatives_limit(&self) -> usize {
        self.validation.alternatives_limit
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ServiceConfig::from_toml_str("").unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.categories_path(), "unique_categories.json");
        assert_eq!(config.model_path(), "car_price_model.json");
        assert_eq!(config.alternatives_limit(), 200);
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 9000

[data]
categories_path = "data/unique_categories.json"
model_path = "data/model.json"

[validation]
alternatives_limit = 80

[logging]
level = "debug"
json = true

[monitoring]
enabled = true
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.model_path(), "data/model.json");
        assert_eq!(config.alternatives_limit(), 80);
        assert!(config.logging.json);
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CAR_PRICE_TEST_MODEL_PATH", "/srv/models/xgb.json");

        let toml_content = r#"
[data]
model_path = "${CAR_PRICE_TEST_MODEL_PATH}"
categories_path = "${CAR_PRICE_TEST_UNSET_VAR}.json"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.data.model_path, "/srv/models/xgb.json");
        assert_eq!(
            config.data.categories_path,
            "${CAR_PRICE_TEST_UNSET_VAR}.json"
        );

        std::env::remove_var("CAR_PRICE_TEST_MODEL_PATH");
    }

    #[test]
    fn test_config_validation() {
        let config = ServiceConfig::from_toml_str("[server]\nport = 70000\n").unwrap();
        assert!(config.validate().is_err());

        let config = ServiceConfig::from_toml_str("[validation]\nalternatives_limit = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = ServiceConfig::from_toml_str("[data]\ncategories_path = \"cats.csv\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = ServiceConfig::from_toml_str("[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = ServiceConfig::from_toml_str("[server\nport = 1").unwrap_err();
        assert!(matches!(err, ServiceError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nhost = \"localhost\"\nport = 8080\n")
            .unwrap();

        let config = ServiceConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.bind_address(), "localhost:8080");
    }
}
