//! Config command - configuration inspection.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the merged configuration (secrets redacted)
    Show,

    /// Show which config files are checked and their precedence
    Which,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = &ctx.loaded;

    println!("# runmedic configuration\n");

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("# No config files loaded (using defaults)\n");
    } else {
        for source in sources {
            println!("# Loaded: {}", source.display());
        }
        println!();
    }

    for warning in &loaded.warnings {
        println!("# warning: {}", warning);
    }

    let mut effective = loaded.config.redacted();
    effective.server = Some(effective.server());
    effective.resource = Some(effective.resource());
    effective.remediation = Some(effective.remediation());
    effective.orchestration = Some(effective.orchestration());
    effective.logging = Some(effective.logging());

    print!("{}", effective.to_toml()?);
    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    println!("Config files (lowest precedence first):");
    for source in &ctx.loaded.sources {
        let marker = if source.loaded { "loaded" } else { "not found" };
        println!("  {} ({})", source.path.display(), marker);
    }
    Ok(())
}
