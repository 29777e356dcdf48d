use std::sync::Once;

/// Filter for the global logger, in `env_logger` syntax ("warn", "soft_rasterizer=debug").
/// `None` defers to `RUST_LOG`, then to `info`.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
}

static INIT: Once = Once::new();

/// Sets up `env_logger` once per process, later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.env_filter.or_else(|| std::env::var("RUST_LOG").ok());
        let mut builder = env_logger::Builder::new();
        match filter {
            Some(filter) => builder.parse_filters(&filter),
            None => builder.filter_level(log::LevelFilter::Info),
        };

        // A test harness may own the logger already.
        if builder.try_init().is_ok() {
            log::debug!("logger ready");
        }
    });
}
