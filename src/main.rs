use car_price_api::api;
use car_price_api::core::ConfigProvider;
use car_price_api::utils::error::{ErrorSeverity, ServiceError};
use car_price_api::utils::monitor::SystemMonitor;
use car_price_api::utils::{logger, validation::Validate};
use car_price_api::CliConfig;
use clap::Parser;
use std::sync::Arc;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown signal received");
}

fn exit_with(e: &ServiceError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(3);
        }
    };

    // 初始化日誌
    logger::init_logger(cli.verbose, config.logging.level.as_deref(), config.logging.json);
    tracing::info!("Starting car-price-api");
    tracing::debug!("Resolved config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    let monitor = SystemMonitor::new(config.monitoring_enabled());
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 啟動時預先載入模型與類別, 避免首個請求才初始化
    let service = Arc::new(api::build_service(&config));
    service.warm_up();
    monitor.log_stats("Startup");

    let listener = match tokio::net::TcpListener::bind(config.bind_address()).await {
        Ok(listener) => listener,
        Err(e) => exit_with(&ServiceError::IoError(e)),
    };

    if let Err(e) = api::serve(listener, service, shutdown_signal()).await {
        exit_with(&e);
    }

    monitor.log_stats("Shutdown");
    tracing::info!("✅ Server stopped");
    Ok(())
}
