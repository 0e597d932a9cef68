//! Command-line interface for noughts_lobby.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Noughts Lobby - hosts concurrent noughts-and-crosses games
#[derive(Parser, Debug)]
#[command(name = "noughts_lobby")]
#[command(about = "Noughts-and-crosses lobby server and client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the lobby server
    Serve {
        /// TOML config file; missing keys use defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Seconds between cursor sweeps (overrides config)
        #[arg(long)]
        reaper_interval: Option<u64>,
    },

    /// Create a new game
    Create {
        /// Name for the new game
        name: String,

        /// Lobby server URL
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        server_url: String,
    },

    /// List every game in the lobby
    List {
        /// Lobby server URL
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        server_url: String,
    },

    /// Show who is playing a game
    Info {
        /// Game name
        name: String,

        /// Lobby server URL
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        server_url: String,
    },

    /// Kill a game
    Kill {
        /// Game name
        name: String,

        /// Lobby server URL
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        server_url: String,
    },
}
