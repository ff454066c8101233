//! Inspect command - one inspection in process, outcome printed as JSON.

use std::time::Duration;

use anyhow::{Result, bail};
use clap::Args;

use runmedic_pipeline::{InspectionOutcome, InstanceStatus, OrchestrationInput};
use runmedic_types::{BearerCredential, InspectionTarget};

use super::Context;
use crate::services::Services;

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const DURABLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Arguments for the inspect command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Subscription id
    #[arg(long)]
    pub subscription: String,

    /// Resource group name
    #[arg(long)]
    pub resource_group: String,

    /// Workflow name
    #[arg(long)]
    pub workflow: String,

    /// Bearer token for the resource API, with or without the `Bearer ` prefix
    #[arg(long, env = "RUNMEDIC_BEARER_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Run through the checkpointed orchestration instead of the direct driver
    #[arg(long)]
    pub durable: bool,
}

/// Run the inspect command.
pub async fn run(args: InspectArgs, ctx: &Context) -> Result<()> {
    let target = InspectionTarget::new(args.subscription, args.resource_group, args.workflow);
    let credential = credential(&args.token);
    let services = Services::from_config(&ctx.loaded.config)?;

    let output = if args.durable {
        let host = services.orchestration_host()?;
        let id = host.start(OrchestrationInput::new(target, credential))?;
        if ctx.verbose {
            eprintln!("Orchestration {}", id);
        }
        let instance = host
            .wait_for_completion(&id, POLL_INTERVAL, DURABLE_TIMEOUT)
            .await?;
        match (instance.status, instance.output) {
            (InstanceStatus::Completed, Some(output)) => output,
            _ => bail!(
                "Orchestration {} failed: {}",
                id,
                instance.error.unwrap_or_else(|| "unknown error".to_string())
            ),
        }
    } else {
        let outcome = services.driver().inspect(&target, &credential).await?;
        if let InspectionOutcome::RemediationUnavailable { reason, .. } = &outcome {
            tracing::warn!(reason = %reason, "Remediation unavailable");
        }
        outcome.to_output()
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn credential(token: &str) -> BearerCredential {
    BearerCredential::from_header(token).unwrap_or_else(|| BearerCredential::from_token(token))
}
