use clap::{Parser, Subcommand};
use iiif_serve::config;
use iiif_serve::server::{self, AppState};
use iiif_serve::service::ImageService;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "iiif-serve")]
#[command(about = "IIIF Image API server (level 1)")]
#[command(long_about = "\
IIIF Image API server (level 1)

Serves images and info.json documents from configured models:

  GET /{model}/{id}/{region}/{size}/{rotation}/{quality}.{format}
  GET /{model}/{id}/info.json
  GET /{model}/{id}                 → 302 to info.json

Missing or denied images are answered with the configured not-found image
(status 404 or 401, never cached).

Run 'iiif-serve gen-config' to generate a documented iiif.toml.")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "iiif.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Validate the configuration without serving
    Check,
    /// Print a stock iiif.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => {
            init_tracing();
            let config = config::load_config(&cli.config)?;
            let service = ImageService::from_config(&config)?;
            let models: Vec<&str> = service.models().names().collect();
            info!(
                bind = %config.bind,
                models = ?models,
                not_found_image = %config.not_found_image()?.display(),
                "starting iiif-serve"
            );
            let app = server::router(AppState::new(service, config.base_url.clone()));
            let listener = tokio::net::TcpListener::bind(config.bind).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            info!("server stopped");
        }
        Command::Check => {
            println!("==> Checking {}", cli.config.display());
            let config = config::load_config(&cli.config)?;
            let service = ImageService::from_config(&config)?;
            for name in service.models().names() {
                println!("    model {name}");
            }
            println!(
                "    not-found image {}",
                config.not_found_image()?.display()
            );
            println!(
                "    cache {}",
                service.cache_policy().header_value().to_str()?
            );
            println!("==> Configuration is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins; otherwise `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed.
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
