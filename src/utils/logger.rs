use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 預設過濾器: verbose 時開啟 debug
fn default_filter(verbose: bool, level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match (verbose, level) {
        (true, _) => EnvFilter::new("car_price_api=debug,info"),
        (false, Some(level)) => EnvFilter::new(format!("car_price_api={},info", level)),
        (false, None) => EnvFilter::new("car_price_api=info"),
    })
}

pub fn init_logger(verbose: bool, level: Option<&str>, json: bool) {
    let registry = tracing_subscriber::registry().with(default_filter(verbose, level));

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .json(),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .init();
    }
}

/// 給工具程式用的簡易 logger
pub fn init_cli_logger(verbose: bool) {
    init_logger(verbose, None, false);
}
