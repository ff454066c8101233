//! Tracing setup: console (human-readable, stderr) + daily-rolling JSON file.

use std::path::PathBuf;

use runmedic_config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const VERBOSE_FILTER: &str = "runmedic=debug,runmedic_server=debug,runmedic_pipeline=debug,runmedic_resource=debug,runmedic_llm=debug,runmedic_config=debug,tower_http=debug,info";
const DEFAULT_FILTER: &str = "runmedic=info,runmedic_server=info,runmedic_pipeline=info,runmedic_resource=info,runmedic_llm=info,warn";
const FILE_FILTER: &str = "runmedic=trace,runmedic_server=trace,runmedic_pipeline=trace,runmedic_resource=trace,runmedic_llm=trace,runmedic_config=trace,info";

/// Install the global subscriber. `RUST_LOG` overrides the console filter.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
pub fn init(verbose: bool, config: &LoggingConfig) -> Option<WorkerGuard> {
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    });
    let console = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    if !config.file {
        tracing_subscriber::registry().with(console).init();
        return None;
    }

    let log_dir = log_directory(config);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "runmedic.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(console)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new(FILE_FILTER)),
        )
        .init();

    Some(guard)
}

fn log_directory(config: &LoggingConfig) -> PathBuf {
    config.directory.clone().unwrap_or_else(|| {
        runmedic_config::user_config_dir()
            .map(|d| d.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    })
}
