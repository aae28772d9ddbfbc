//! Command handlers. venvr has a single command: build every `ENV_DIR`.

pub mod create;
