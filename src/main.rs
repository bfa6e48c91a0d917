use std::sync::Arc;

use clap::{Parser, Subcommand};

use medassist::config::Config;
use medassist::domains::medical::Coordinates;
use medassist::error::{MedAssistError, Result};
use medassist::interfaces::services::GeolocationProvider;
use medassist::providers::geolocation::{FixedGeolocation, NoGeolocation};
use medassist::{daemon, factory, repl};

#[derive(Parser, Debug)]
#[command(name = "medassist")]
#[command(about = "Medical assistant chat backend")]
struct Cli {
    /// JSON config file; missing files fall back to defaults.
    #[arg(long, env = "MEDASSIST_CONFIG", default_value = "medassist.json")]
    config: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the chat over HTTP.
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
    /// Chat in the terminal.
    Chat {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    medassist::logging::init_tracing("medassist");
    let cli = Cli::parse();
    let config = Config::load_or_default(Some(&cli.config))?;

    match cli.command.unwrap_or(Commands::Chat {
        lat: None,
        lon: None,
    }) {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server_host());
            let port = port.unwrap_or_else(|| config.server_port());
            let shutdown = async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %err, "failed to listen for ctrl-c");
                    std::future::pending::<()>().await;
                }
                tracing::info!("shutting down");
            };
            daemon::run_with_shutdown(&config, &host, port, shutdown).await
        }
        Commands::Chat { lat, lon } => {
            let geolocation: Arc<dyn GeolocationProvider> = match (lat, lon) {
                (Some(lat), Some(lon)) => Arc::new(FixedGeolocation::new(Coordinates::new(lat, lon))?),
                (None, None) => Arc::new(NoGeolocation),
                _ => {
                    return Err(MedAssistError::Config(
                        "--lat and --lon must be given together".to_string(),
                    ))
                }
            };
            let session = factory::build_session(&config, geolocation).await?;
            repl::run(session).await
        }
    }
}
