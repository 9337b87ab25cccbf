//! compreflex server binary.
//!
//! ```text
//!   browser ──▶ facade :35000 ──/cliente──▶ client page
//!                      │
//!                      └─/consulta──▶ backend :45000 ──/compreflex──▶ engine
//! ```
//!
//! One process runs one role, chosen by subcommand.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use compreflex::config::{load_config, validate_config, AppConfig};
use compreflex::lifecycle::{self, signals, Shutdown};
use compreflex::observability::logging;

#[derive(Parser)]
#[command(name = "compreflex", version)]
#[command(about = "Reflective command calculator servers", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long, env = "COMPREFLEX_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand)]
enum Role {
    /// Run the execution backend (serves /compreflex).
    Backend {
        /// Override backend.bind_address.
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Run the facade (serves /cliente and /consulta).
    Facade {
        /// Override facade.bind_address.
        #[arg(short, long)]
        bind: Option<String>,

        /// Override facade.backend_url.
        #[arg(long, env = "COMPREFLEX_BACKEND_URL")]
        backend_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    match &cli.role {
        Role::Backend { bind } => {
            if let Some(bind) = bind {
                config.backend.bind_address = bind.clone();
            }
        }
        Role::Facade { bind, backend_url } => {
            if let Some(bind) = bind {
                config.facade.bind_address = bind.clone();
            }
            if let Some(url) = backend_url {
                config.facade.backend_url = url.clone();
            }
        }
    }
    // Overrides bypass the loader, so check again.
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("config error: {error}");
        }
        return Err(compreflex::config::ConfigError::Validation(errors).into());
    }

    logging::init(&config.observability.log_level);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        "compreflex starting"
    );

    let shutdown = Shutdown::new();
    signals::install(&shutdown);

    match cli.role {
        Role::Backend { .. } => lifecycle::run_backend(&config, &shutdown).await?,
        Role::Facade { .. } => lifecycle::run_facade(&config, &shutdown).await?,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
