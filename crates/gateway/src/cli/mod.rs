//! CLI surface (spec.md §6): `autosage [serve]`, plus `doctor`, `config
//! show|validate`, and `version`. Mirrors the teacher gateway's
//! `clap`-derived `Cli`/`Command` shape.

pub mod config;
pub mod doctor;

use clap::{Parser, Subcommand};

use autosage_core::config::Config;

#[derive(Debug, Parser)]
#[command(name = "autosage", version, about = "AutoSage geometry-fit service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Override `server.host` from the config file.
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Override `server.port` from the config file.
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Override `server.log_level` from the config file.
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the gateway server (default when no subcommand is given).
    Serve,
    /// Run startup health checks against the resolved configuration.
    Doctor,
    /// Inspect or validate the configuration file.
    Config(ConfigCommand),
    /// Print the binary's version and exit.
    Version,
}

#[derive(Debug, clap::Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Print the resolved configuration as TOML.
    Show,
    /// Validate the configuration file, exiting 1 on any error-severity issue.
    Validate,
}

/// Path to the config file: `AUTOSAGE_CONFIG` env var, or `config.toml`
/// in the current directory.
pub fn config_path() -> String {
    std::env::var("AUTOSAGE_CONFIG").unwrap_or_else(|_| "config.toml".to_string())
}

/// Load the configuration, applying `Cli`'s `--host`/`--port`/`--log-level`
/// overrides on top of the file (or defaults, if the file is absent).
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let path = config_path();
    let mut config = Config::load(std::path::Path::new(&path))?;

    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(log_level) = &cli.log_level {
        config.server.log_level = log_level.clone();
    }

    Ok(config)
}
