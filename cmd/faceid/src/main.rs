//! faceid - face enrollment and login by embedding.
//!
//! Embeddings come from an external extractor, either as a JSON array of
//! floats or as raw little-endian f32 bytes.

mod commands;
mod config;
mod server;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ListCommand, LoginCommand, RegisterCommand, ServeCommand};

/// faceid - register and authenticate people by face embedding.
///
/// Configuration is read from ~/.faceid/config.yaml unless --config is given.
#[derive(Parser)]
#[command(name = "faceid")]
#[command(about = "Face embedding enrollment and login")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.faceid/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enroll a new user with a face embedding
    Register(RegisterCommand),
    /// Identify a face embedding
    Login(LoginCommand),
    /// List enrolled users
    List(ListCommand),
    /// Serve the JSON HTTP API
    Serve(ServeCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Register(cmd) => cmd.run(&cli),
        Commands::Login(cmd) => cmd.run(&cli),
        Commands::List(cmd) => cmd.run(&cli),
        Commands::Serve(cmd) => cmd.run(&cli).await,
    }
}
