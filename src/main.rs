use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_lineup::{
    config::Config,
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "m3u-lineup")]
#[command(version)]
#[command(about = "Builds M3U playlists from free streaming-service channel catalogs")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("m3u_lineup={0},tower_http={0}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::load_from_file(&cli.config)?;

    // CLI arguments win over file and environment
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    if cli.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!("Starting M3U Lineup v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Catalogs from {}, guides from {}",
        config.upstream.catalog_base_url, config.upstream.guide_base_url
    );
    if config.services.pluto.token_bootstrap {
        info!("Pluto session token bootstrap enabled");
    }

    let state = AppState::from_config(config)?;
    let server = WebServer::new(state)?;
    server.serve().await?;

    info!("Server stopped");
    Ok(())
}
