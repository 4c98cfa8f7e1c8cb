//! Bridge Configuration - library location and native logger setup

use crate::error::{Error, Result};
use crate::types::{LevelFilter, LoggerConfig};
use std::path::PathBuf;

/// Overrides the library path.
pub const LIBRARY_ENV: &str = "SDK_BRIDGE_LIBRARY";
/// Native logger level initialised at open time.
pub const NATIVE_LOG_ENV: &str = "SDK_BRIDGE_NATIVE_LOG";

/// Directory searched when no path is configured, relative to the working directory.
pub const DEFAULT_LIBRARY_DIR: &str = "target/debug";

#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    pub library_path: Option<PathBuf>,
    pub logger: Option<LoggerConfig>,
}

impl BridgeConfig {
    pub fn new() -> Self { Self::default() }
    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self { self.library_path = Some(path.into()); self }
    pub fn with_logger(mut self, logger: LoggerConfig) -> Self { self.logger = Some(logger); self }

    /// Defaults overlaid with `SDK_BRIDGE_LIBRARY` and `SDK_BRIDGE_NATIVE_LOG`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();
        if let Some(path) = non_empty_var(LIBRARY_ENV) {
            config = config.with_library_path(path);
        }
        if let Some(level) = non_empty_var(NATIVE_LOG_ENV) {
            let level: LevelFilter = level
                .parse()
                .map_err(|e| Error::Config(format!("{NATIVE_LOG_ENV}: {e}")))?;
            config = config.with_logger(LoggerConfig::new(level));
        }
        Ok(config)
    }

    /// Configured path, or the platform default under the working directory.
    pub fn resolve_library_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.library_path {
            return Ok(path.clone());
        }
        let file = default_library_file()?;
        let cwd = std::env::current_dir()
            .map_err(|e| Error::Config(format!("cannot read working directory: {e}")))?;
        Ok(cwd.join(DEFAULT_LIBRARY_DIR).join(file))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// File name of the native library on this platform.
pub fn default_library_file() -> Result<&'static str> {
    library_file_for(std::env::consts::OS)
}

fn library_file_for(os: &str) -> Result<&'static str> {
    match os {
        "linux" => Ok("libiota_sdk_native.so"),
        "macos" => Ok("libiota_sdk_native.dylib"),
        "windows" => Ok("iota_sdk_native.dll"),
        other => Err(Error::UnsupportedPlatform(other.to_string())),
    }
}
