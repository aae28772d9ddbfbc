//! Config structs grouped by concern.
//!
//! Loaded from environment variables with the shared fallback logic.

use super::env_keys::{observability as obv_keys, runtime as rt_keys};
use super::loader::{env_bool, env_optional, env_or};

/// Observability config: quiet, log_level, log_json
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(Self::load)
    }

    fn load() -> Self {
        super::loader::load_dotenv();
        Self {
            quiet: env_bool(obv_keys::VENVR_QUIET, obv_keys::QUIET_ALIASES, false),
            log_level: env_or(obv_keys::VENVR_LOG_LEVEL, obv_keys::LOG_LEVEL_ALIASES, || {
                "venvr=info".to_string()
            }),
            log_json: env_bool(obv_keys::VENVR_LOG_JSON, obv_keys::LOG_JSON_ALIASES, false),
        }
    }

    /// Filter directive used when `RUST_LOG` is not set.
    pub fn filter_directive(&self) -> String {
        if self.quiet {
            "venvr=warn".to_string()
        } else {
            self.log_level.clone()
        }
    }
}

/// Commands used to reach the Python and R installations.
///
/// Resolved once at startup and handed to the builder; `None` means "search
/// `PATH`".
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub python: Option<String>,
    pub r_command: Option<String>,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            python: env_optional(rt_keys::VENVR_PYTHON, rt_keys::PYTHON_ALIASES),
            r_command: env_optional(rt_keys::VENVR_R, rt_keys::R_ALIASES),
        }
    }
}
