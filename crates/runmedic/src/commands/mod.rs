//! CLI command handlers.

pub mod config;
pub mod inspect;
pub mod serve;

use runmedic_config::LoadedConfig;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged configuration and where it came from.
    pub loaded: LoadedConfig,
    /// Verbose output enabled.
    pub verbose: bool,
}
