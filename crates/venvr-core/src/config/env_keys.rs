//! Environment variable key constants and aliases.
//!
//! Primary variables use the `VENVR_*` prefix.

/// Runtime command overrides
pub mod runtime {
    /// Python interpreter used to run `-m venv`
    pub const VENVR_PYTHON: &str = "VENVR_PYTHON";
    pub const PYTHON_ALIASES: &[&str] = &[];

    /// R front-end used for `R RHOME`
    pub const VENVR_R: &str = "VENVR_R";
    pub const R_ALIASES: &[&str] = &["R_EXECUTABLE"];
}

/// Observability and logging
pub mod observability {
    pub const VENVR_QUIET: &str = "VENVR_QUIET";
    pub const QUIET_ALIASES: &[&str] = &[];

    pub const VENVR_LOG_LEVEL: &str = "VENVR_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &[];

    pub const VENVR_LOG_JSON: &str = "VENVR_LOG_JSON";
    pub const LOG_JSON_ALIASES: &[&str] = &[];
}
