//! Serve command - runs the HTTP API.

use anyhow::{Context as _, Result};
use clap::Args;

use runmedic_server::{AppState, Server, ServerConfig};

use super::Context;
use crate::services::Services;

/// Arguments for the serve command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Disable the durable orchestration endpoints
    #[arg(long)]
    pub no_orchestration: bool,
}

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    let config = &ctx.loaded.config;

    let mut server_section = config.server();
    if let Some(bind) = args.bind {
        server_section.bind = bind;
    }
    if let Some(port) = args.port {
        server_section.port = port;
    }
    let addr = server_section
        .socket_addr()
        .context("Invalid server bind address")?;

    let services = Services::from_config(config)?;
    let server_config = ServerConfig::new()
        .with_bind_address(addr)
        .with_request_logging(server_section.request_logging)
        .with_max_body_size(server_section.max_body_size);
    let mut state = AppState::new(services.driver(), server_config);

    let orchestration = config.orchestration();
    if orchestration.enabled && !args.no_orchestration {
        let host = services.orchestration_host()?;
        if orchestration.resume_on_start {
            let resumed = host.resume_incomplete()?;
            if resumed > 0 {
                tracing::info!(resumed, "Resumed incomplete orchestrations");
            }
        }
        state = state.with_orchestrations(host);
    } else {
        tracing::info!("Orchestration endpoints disabled");
    }

    if ctx.verbose {
        eprintln!("Listening on http://{}", addr);
    }

    Server::from_state(state).run().await?;
    Ok(())
}
