//! venvr unified configuration layer
//!
//! All environment variable reads are centralised here; build code receives
//! structured config values instead of calling `std::env::var` itself.
//!
//! - `loader`: env_or, env_optional, env_bool helpers and `.env` loading
//! - `schema`: ObservabilityConfig, RuntimeConfig
//! - `env_keys`: key constants (with alias chains)

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv, load_dotenv_from_dir};
pub use schema::{ObservabilityConfig, RuntimeConfig};
