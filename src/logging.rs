//! Process-side logging. The native library's logger is configured separately via
//! `Bridge::init_logger`.

use tracing_subscriber::{fmt, EnvFilter};

/// Set to `1` for JSON log lines.
pub const LOG_JSON_ENV: &str = "SDK_BRIDGE_LOG_JSON";

/// Directive used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::from_flag(std::env::var(LOG_JSON_ENV).ok().as_deref())
    }

    fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(str::trim) {
            Some("1") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Installs a stderr subscriber once. Later calls are no-ops.
pub fn init_logging() {
    init_logging_with(LogFormat::from_env());
}

pub fn init_logging_with(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}
