use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors.
///
/// Raised while loading or validating tick/cell configuration. These are
/// setup-time failures: nothing in the per-tick path returns them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid tick_dt: {0} (must be > 0)")]
    InvalidTickDt(f64),

    #[error("max_catchup_steps must be >= 1")]
    ZeroCatchup,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
