//! Chronoscope: temporal queries over sensor observation containers

use chronoscope_core::{ChronoscopeConfig, RepresentationPreferences, ResourceIdentifier};
use chronoscope_gateway::{build_store, start_gateway};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "chronoscope",
    about = "Chronoscope: temporal queries over containers of sensor observations"
)]
struct Cli {
    /// Config file (TOML). Missing file means defaults.
    #[arg(short, long, global = true, default_value = "chronoscope.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve a directory over HTTP
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory served as the root container
        #[arg(short, long)]
        root: Option<PathBuf>,
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Evaluate one request against a directory and print the result
    Query {
        #[arg(short, long)]
        root: Option<PathBuf>,
        #[arg(long)]
        base_url: Option<String>,
        /// Accept header to send, e.g. "text/turtle"
        #[arg(long)]
        accept: Option<String>,
        /// Absolute identifier, or a path relative to the base URL
        target: String,
    },
    /// Print the effective configuration
    Config,
    /// Show version
    Version,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chronoscope=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            root,
            base_url,
        } => {
            init_tracing();
            let mut config = ChronoscopeConfig::load(&cli.config);
            if let Some(port) = port {
                config.server.port = port;
            }
            apply_overrides(&mut config, root, base_url);
            start_gateway(config).await?;
        }

        Commands::Query {
            root,
            base_url,
            accept,
            target,
        } => {
            init_tracing();
            let mut config = ChronoscopeConfig::load(&cli.config);
            apply_overrides(&mut config, root, base_url);

            let store = build_store(&config)?;
            let identifier = resolve_target(&config.base_url(), &target);
            let preferences = accept
                .as_deref()
                .map(RepresentationPreferences::from_accept)
                .unwrap_or_default();

            let representation = store
                .get_representation(&identifier, &preferences, None)
                .await?;
            let content_type = representation
                .metadata
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let body = representation.data.read_to_string().await?;
            println!("Content-Type: {}", content_type);
            println!();
            println!("{}", body);
        }

        Commands::Config => {
            let config = ChronoscopeConfig::load(&cli.config);
            print!("{}", config.to_toml());
        }

        Commands::Version => {
            println!("chronoscope v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn apply_overrides(config: &mut ChronoscopeConfig, root: Option<PathBuf>, base_url: Option<String>) {
    if let Some(root) = root {
        config.server.root = root;
    }
    if let Some(base_url) = base_url {
        config.server.base_url = base_url;
    }
}

fn resolve_target(base_url: &str, target: &str) -> ResourceIdentifier {
    if target.starts_with("http://") || target.starts_with("https://") {
        ResourceIdentifier::new(target)
    } else {
        ResourceIdentifier::new(format!("{}{}", base_url, target.trim_start_matches('/')))
    }
}
