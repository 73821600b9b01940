use super::{Cli, Commands};
use crate::backends::Backends;
use crate::config::Config;
use crate::gateway;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Resolve the config for `cli`: file, then environment, then flags.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_or_init_at(path)?,
        None => Config::load_or_init()?,
    };
    config.apply_env_overrides();

    if let Commands::Serve { port, host } = &cli.command {
        if let Some(port) = port {
            config.gateway.port = *port;
        }
        if let Some(host) = host {
            config.gateway.host.clone_from(host);
        }
    }

    config.validate()?;
    Ok(config)
}

pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Serve { .. } => gateway::run_gateway(Arc::new(config)).await,

        Commands::IssueKey => {
            let backends = Backends::open(&config).await?;
            let api_key = backends.store.issue_api_key().await?;
            println!("{api_key}");
            Ok(())
        }

        Commands::CreateProject { api_key, name } => {
            let backends = Backends::open(&config).await?;
            let project_id = backends.store.create_project(&api_key, &name).await?;
            println!("{project_id}");
            Ok(())
        }

        Commands::ShowProject { api_key, name } => {
            let backends = Backends::open(&config).await?;
            let project = backends.store.get_project(&api_key, &name).await?;
            let rendered =
                serde_json::to_string_pretty(&project).context("render project as JSON")?;
            println!("{rendered}");
            Ok(())
        }
    }
}
