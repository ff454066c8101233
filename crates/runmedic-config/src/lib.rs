//! Configuration system for runmedic.
//!
//! Provides TOML-based configuration with:
//! - Sections for the HTTP server, the resource-management client, the
//!   remediation model, durable orchestration and logging
//! - Config file layering (user config dir + project-local override)
//! - API key resolution (env var → config file, with a plaintext warning)

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    CONFIG_DIR_ENV, ConfigSource, LoadedConfig, load_config, load_config_file,
    load_config_with_options, user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use secrets::{ResolvedSecret, SecretSource, resolve_generative_api_key};
pub use types::*;
