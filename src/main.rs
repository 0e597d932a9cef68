//! Noughts Lobby - server and command-line client.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use noughts_lobby::{AppState, HttpPeer, LobbyClient, LobbyConfig, SessionRegistry, router};
use std::path::PathBuf;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            port,
            host,
            reaper_interval,
        } => run_server(config, host, port, reaper_interval).await,
        Command::Create { name, server_url } => {
            let details = LobbyClient::new(server_url).create(&name).await?;
            println!("Created {} ({})", details.name, details.occupancy);
            Ok(())
        }
        Command::List { server_url } => {
            let sessions = LobbyClient::new(server_url).list().await?;
            if sessions.is_empty() {
                println!("No games in the lobby");
            }
            for info in sessions {
                println!("{}", info.name);
            }
            Ok(())
        }
        Command::Info { name, server_url } => {
            let details = LobbyClient::new(server_url).info(&name).await?;
            println!("{}: {}", details.name, details.occupancy);
            println!("{}", details.board.display());
            Ok(())
        }
        Command::Kill { name, server_url } => {
            LobbyClient::new(server_url).kill(&name).await?;
            println!("Killed {}", name);
            Ok(())
        }
    }
}

/// Run the lobby HTTP server until Ctrl-C.
#[instrument]
async fn run_server(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    reaper_interval: Option<u64>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => LobbyConfig::from_file(path)?,
        None => LobbyConfig::default(),
    };
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(secs) = reaper_interval {
        config = config.with_reaper_interval_secs(secs);
    }
    config.validate()?;

    let registry = SessionRegistry::new(&config);
    let http = HttpPeer::client(config.delivery_timeout())?;
    let app = router(AppState::new(
        registry.clone(),
        http,
        *config.default_page_size(),
    ));

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(addr = %listener.local_addr()?, "Lobby ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "Failed to listen for Ctrl-C");
            }
            info!("Shutting down");
        })
        .await?;

    registry.shutdown().await;
    Ok(())
}
