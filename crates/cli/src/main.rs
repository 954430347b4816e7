//! # agent-host
//!
//! Command-line transport for the agent host.
//!
//! - `agent-host agents` lists the agent types this host can run
//! - `agent-host exec` runs one command and prints the response
//! - `agent-host voice` resolves free text against an agent
//! - `agent-host serve` speaks JSON lines on stdin/stdout

use ah_core::config::load_config;
use ah_core::AgentHost;
use ah_protocol::config_models::LogFormat;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

mod commands;
mod logging;
mod serve;

/// Multi-tenant agent host
#[derive(Parser)]
#[command(name = "agent-host")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project root containing `.agent-host/`
    #[arg(long, global = true, env = "AGENT_HOST_ROOT", default_value = ".")]
    root: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides config.toml
    #[arg(long, global = true, env = "AGENT_HOST_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (pretty, json); overrides config.toml
    #[arg(long, global = true, value_parser = logging::parse_log_format)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the agent types this host can run
    Agents {
        /// Also list known agent types without an implementation
        #[arg(long)]
        all: bool,
    },

    /// Execute one command and print the response as JSON
    Exec {
        #[arg(long, default_value = "cli")]
        tenant: String,

        /// Agent number
        #[arg(long)]
        agent: u32,

        #[arg(long)]
        action: String,

        /// Command parameter as key=value (repeatable)
        #[arg(long = "param", value_parser = commands::parse_param)]
        params: Vec<(String, Value)>,
    },

    /// Initialize an agent and run a voice command against it
    Voice {
        #[arg(long, default_value = "cli")]
        tenant: String,

        /// Agent number
        #[arg(long)]
        agent: u32,

        /// The spoken text
        text: String,
    },

    /// Read operations as JSON lines from stdin until shutdown or EOF
    Serve,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = load_config(&cli.root).await?;
    let level = cli
        .log_level
        .unwrap_or_else(|| config.settings.log_level.clone());
    let format = cli.log_format.unwrap_or(config.settings.log_format);
    logging::init_logging(&level, format)?;
    debug!(root = %cli.root.display(), agent_configs = config.agent_configs.len(), "Configuration loaded");

    let host = AgentHost::from_config(config);

    match cli.command {
        Commands::Agents { all } => {
            commands::list_agents(&host, all);
            Ok(())
        }
        Commands::Exec {
            tenant,
            agent,
            action,
            params,
        } => {
            let succeeded = commands::exec(&host, tenant, agent, action, params).await?;
            host.manager().shutdown_all_agents().await;
            if !succeeded {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Voice {
            tenant,
            agent,
            text,
        } => {
            let result = commands::voice(&host, tenant, agent, text).await;
            host.manager().shutdown_all_agents().await;
            result
        }
        Commands::Serve => serve::serve(host).await,
    }
}
