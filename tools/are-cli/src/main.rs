//! ARE CLI - talk to an ARE runtime environment from the shell
//!
//! # Examples
//!
//! ```bash
//! # Print the current model state
//! are get model-state
//!
//! # Follow model state changes until Ctrl-C
//! are --base-uri http://are-host:8081/rest/ subscribe model_state_changed
//!
//! # Path-segment encoding
//! are encode "model.acs"
//! ```

mod commands;
mod output;

use anyhow::Result;
use are_rest_core::ClientConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{codec, get, subscribe};

/// ARE runtime environment command-line client
#[derive(Parser)]
#[command(name = "are")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file path
    #[arg(short, long, global = true, env = "ARE_CONFIG")]
    config: Option<String>,

    /// Base URI of the server's REST interface (overrides the config file)
    #[arg(short, long, global = true)]
    base_uri: Option<String>,

    /// Output format
    #[arg(short = 'o', long, global = true, default_value = "text")]
    output_format: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print events of one category as they arrive
    Subscribe(subscribe::SubscribeArgs),

    /// Fetch a read-only resource
    Get(get::GetArgs),

    /// Encode text as a path segment
    Encode(codec::EncodeArgs),

    /// Decode a path segment back to text
    Decode(codec::DecodeArgs),
}

fn load_config(path: Option<&str>, base_uri: Option<String>) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(path)?;
    if let Some(base_uri) = base_uri {
        config.server.base_uri = base_uri;
        config.validate()?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    let out = output::Outputter::new(cli.output_format);

    let result = match cli.command {
        Commands::Encode(args) => codec::encode(args, &out),
        Commands::Decode(args) => codec::decode(args, &out),
        Commands::Subscribe(args) => match load_config(cli.config.as_deref(), cli.base_uri) {
            Ok(config) => subscribe::execute(args, config, &out).await,
            Err(e) => Err(e),
        },
        Commands::Get(args) => match load_config(cli.config.as_deref(), cli.base_uri) {
            Ok(config) => get::execute(args, config, &out).await,
            Err(e) => Err(e),
        },
    };

    // Handle exit codes
    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {:#}", e);
            }
            std::process::exit(1);
        }
    }
}
