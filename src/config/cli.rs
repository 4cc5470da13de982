use crate::config::toml_config::ServiceConfig;
use crate::utils::error::Result;
use clap::Parser;

/// 命令列參數, 優先於 TOML 設定
#[derive(Debug, Clone, Parser)]
#[command(name = "car-price-api")]
#[command(about = "HTTP service predicting used car prices with category-validated input")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u32>,

    /// Category file produced by gencat
    #[arg(long)]
    pub categories: Option<String>,

    /// Serialized model artifact
    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub alternatives_limit: Option<usize>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory usage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    pub fn resolve(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(categories) = &self.categories {
            config.data.categories_path = categories.clone();
        }
        if let Some(model) = &self.model {
            config.data.model_path = model.clone();
        }
        if let Some(limit) = self.alternatives_limit {
            config.validation.alternatives_limit = limit;
        }
        if self.monitor {
            config.monitoring.enabled = true;
        }
        if self.json_logs {
            config.logging.json = true;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_config_file() {
        let cli = CliConfig::parse_from(["car-price-api"]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[server]\nport = 9000\n[data]\nmodel_path = \"from_file.json\"\n")
            .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = CliConfig::parse_from([
            "car-price-api",
            "--config",
            path.as_str(),
            "--port",
            "9100",
            "--monitor",
        ]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.model_path(), "from_file.json");
        assert!(config.monitoring_enabled());
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cli = CliConfig::parse_from(["car-price-api", "--config", "/nonexistent/service.toml"]);
        assert!(cli.resolve().is_err());
    }
}
