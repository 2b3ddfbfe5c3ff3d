// media-resolver CLI
//
// JSON on stdout; on failure a JSON error object with a stable code on
// stderr and a non-zero exit status.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

use media_resolver_lib::gate::{AccessGate, GateError, InMemoryCredentialStore};
use media_resolver_lib::logging::init_logging;
use media_resolver_lib::resolver::providers::all_providers;
use media_resolver_lib::resolver::{
    validate_media_url, MediaResolverError, ResolutionOrchestrator, ValidationError,
};
use media_resolver_lib::ResolverConfig;

#[derive(Parser, Debug)]
#[command(name = "media-resolver")]
#[command(about = "Resolve media links into downloadable formats", long_about = None)]
struct Cli {
    /// Config file (JSON)
    #[arg(long, global = true, env = "MEDIA_RESOLVER_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List supported providers
    Providers,

    /// Normalize a URL and detect its provider
    Validate { url: String },

    /// Resolve formats without an API key
    Resolve { url: String },

    /// Check an API key, consume one unit and resolve
    Authorize {
        #[command(flatten)]
        access: AccessArgs,
        url: String,
    },

    /// Check an API key and resolve without consuming quota
    Preview {
        #[command(flatten)]
        access: AccessArgs,
        url: String,
    },
}

#[derive(clap::Args, Debug)]
struct AccessArgs {
    /// API key
    #[arg(long, env = "MEDIA_RESOLVER_API_KEY")]
    key: String,

    /// Credentials file (JSON array)
    #[arg(long)]
    credentials: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ResolverConfig::load(cli.config.as_deref()).context("loading config")?;
    init_logging(&config.logging, cli.verbose).context("initializing logging")?;
    debug!(command = ?cli.command, "starting");

    match cli.command {
        Command::Providers => {
            let providers: Vec<_> = all_providers()
                .iter()
                .map(|p| {
                    json!({
                        "id": p.id,
                        "label": p.label,
                        "patterns": p.patterns().collect::<Vec<_>>(),
                    })
                })
                .collect();
            print_json(&providers)
        }
        Command::Validate { url } => {
            let validated = validate_media_url(&url)?;
            print_json(&json!({
                "normalized_url": validated.as_str(),
                "host": validated.host(),
                "provider": {
                    "id": validated.provider_id(),
                    "label": validated.provider().label,
                },
            }))
        }
        Command::Resolve { url } => {
            let links = config.link_builder()?;
            let orchestrator = orchestrator(&config);
            let info = orchestrator.resolve_media(&url).await?;
            print_json(&links.project(&info))
        }
        Command::Authorize { access, url } => {
            let links = config.link_builder()?;
            let gate = gate(&config, &access).await?;
            let info = gate.authorize_and_resolve(&access.key, &url).await?;
            print_json(&links.project(&info))
        }
        Command::Preview { access, url } => {
            let links = config.link_builder()?;
            let gate = gate(&config, &access).await?;
            let info = gate.preview(&access.key, &url).await?;
            print_json(&links.project(&info))
        }
    }
}

fn orchestrator(config: &ResolverConfig) -> ResolutionOrchestrator {
    ResolutionOrchestrator::with_default_backends(&config.extractor, config.backends.clone())
}

async fn gate(config: &ResolverConfig, access: &AccessArgs) -> Result<AccessGate> {
    let store = load_credentials(&access.credentials).await?;
    Ok(AccessGate::new(Arc::new(store), Arc::new(orchestrator(config))))
}

/// A broken credentials file is an operator error, not a store outage.
async fn load_credentials(path: &Path) -> Result<InMemoryCredentialStore> {
    InMemoryCredentialStore::load_json(path)
        .await
        .with_context(|| format!("loading credentials file {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(err: &anyhow::Error) {
    let code = if let Some(e) = err.downcast_ref::<GateError>() {
        Some(e.code())
    } else if let Some(e) = err.downcast_ref::<MediaResolverError>() {
        if let Some(cause) = &e.cause {
            debug!(backend = ?e.failed_backend, cause = %cause, "resolution failure cause");
        }
        Some(e.code)
    } else {
        err.downcast_ref::<ValidationError>().map(ValidationError::code)
    };

    let body = match code {
        Some(code) => json!({
            "error": {
                "code": code,
                "status": code.status_code(),
                "message": err.to_string(),
            }
        }),
        None => json!({
            "error": {
                "code": "INTERNAL",
                "message": format!("{:#}", err),
            }
        }),
    };
    eprintln!("{}", body);
}
