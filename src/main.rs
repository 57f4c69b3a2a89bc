//! CLI entry point for `vibecode`.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use dotenvy::dotenv;

use vibecode::config::{Config, default_config_path};
use vibecode::relay::{RelayOptions, run_relay_server};
use vibecode::{logging, repl};

#[derive(Parser, Debug)]
#[command(
    name = "vibecode",
    author,
    version,
    about = "VibeCode - AI pair programming workspace and relay",
    long_about = "Drive an in-memory project with an AI agent.\n\nRun 'vibecode serve' to start the relay, then 'vibecode' to open a workspace."
)]
struct Cli {
    /// Subcommand to run (defaults to `repl`)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Run the relay that forwards chat turns to the AI gateway
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(long)]
        port: Option<u16>,
    },
    /// Open an interactive workspace backed by a relay
    Repl {
        /// Relay endpoint, e.g. http://127.0.0.1:8787/v1/agent-chat
        #[arg(long)]
        relay_url: Option<String>,
    },
    /// Print resolved configuration
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load(cli.config.clone())?;
    match cli.command.unwrap_or(Commands::Repl { relay_url: None }) {
        Commands::Serve { host, port } => {
            let mut options = RelayOptions::from_config(&config);
            if let Some(host) = host {
                options.host = host;
            }
            if let Some(port) = port {
                options.port = port;
            }
            run_relay_server(config, options).await
        }
        Commands::Repl { relay_url } => {
            if relay_url.is_some() {
                config.relay_url = relay_url;
            }
            repl::run_repl(&config).await
        }
        Commands::Doctor => {
            run_doctor(&config, cli.config);
            Ok(())
        }
    }
}

fn run_doctor(config: &Config, config_path: Option<PathBuf>) {
    println!("{}", "VibeCode Doctor".bold());
    println!("{}", "===============".dimmed());
    println!();

    println!("{}", "Version Information:".bold());
    println!("  vibecode: {}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("{}", "Configuration:".bold());
    match config_path.or_else(default_config_path) {
        Some(path) if path.exists() => {
            println!("  {} config found at {}", "✓".green(), path.display());
        }
        Some(path) => println!(
            "  {} {} not found (using defaults)",
            "!".yellow(),
            path.display()
        ),
        None => println!("  {} no home directory (using defaults)", "!".yellow()),
    }
    println!("  gateway: {}", config.gateway_url());
    println!("  model: {}", config.model());
    println!("  temperature: {}", config.temperature());
    println!("  max_tokens: {}", config.max_tokens());
    println!("  relay bind: {}:{}", config.host(), config.port());
    println!("  relay url: {}", config.relay_url());
    println!();

    println!("{}", "API Keys:".bold());
    if config.api_key().is_some() {
        println!("  {} gateway API key configured", "✓".green());
    } else {
        println!("  {} gateway API key not configured", "✗".red());
        println!("    Set VIBECODE_API_KEY or api_key in config.toml");
    }
}
