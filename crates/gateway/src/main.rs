//! Process entry point (spec.md §6 CLI surface), grounded in the teacher
//! gateway's `main.rs`: parse the CLI, initialize tracing, validate the
//! config, then either serve or run one of the maintenance subcommands.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use autosage_core::config::{Config, ConfigSeverity, CorsConfig};

use autosage_gateway::cli::{Cli, Command, ConfigAction};
use autosage_gateway::state::AppState;
use autosage_gateway::{api, cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        None | Some(Command::Serve) => {
            init_tracing(cli.log_level.as_deref());
            let config = Arc::new(cli::load_config(&cli)?);
            run_server(config).await
        }
        Some(Command::Doctor) => {
            let config = cli::load_config(&cli)?;
            let passed = cli::doctor::run(&config, &cli::config_path()).await;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(command)) => {
            let config = cli::load_config(&cli)?;
            match command.action {
                ConfigAction::Show => cli::config::show(&config),
                ConfigAction::Validate => {
                    if !cli::config::validate(&config) {
                        std::process::exit(1);
                    }
                }
            }
            Ok(())
        }
        Some(Command::Version) => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing(override_level: Option<&str>) {
    let default_filter = format!("{},autosage_gateway=debug", override_level.unwrap_or("info"));
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .json()
        .init();
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    tracing::info!("AutoSage gateway starting");

    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("{issue}"),
            ConfigSeverity::Error => tracing::error!("{issue}"),
        }
    }
    let error_count = issues.iter().filter(|i| i.severity == ConfigSeverity::Error).count();
    if error_count > 0 {
        anyhow::bail!("config validation failed with {error_count} error(s)");
    }

    let state = AppState::build(config.clone()).context("building application state")?;

    let cors = build_cors_layer(&config.server.cors);
    let app = api::router(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;
    tracing::info!(addr = %addr, "AutoSage gateway listening");
    axum::serve(listener, app).await.context("gateway server error")?;
    Ok(())
}

/// Build a `CorsLayer` honoring `*` and `host:*` wildcard-port patterns in
/// `cors.allowed_origins` (grounded in the teacher's `build_cors_layer`).
fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    if cors.allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    }

    let patterns = cors.allowed_origins.clone();
    CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(AllowOrigin::predicate(move |origin, _parts| {
            let Ok(origin) = origin.to_str() else { return false };
            patterns.iter().any(|pattern| origin_matches(pattern, origin))
        }))
}

fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => origin.starts_with(prefix),
        None => pattern == origin,
    }
}
