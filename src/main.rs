//! RestMode CLI - a break reminder for long work sessions
//!
//! The daemon tracks how long you have been working and schedules regular
//! rest breaks:
//! - a short break every work interval
//! - a longer break every few cycles
//! - pause/reset handling when you step away from the machine

use anyhow::Result;
use clap::{CommandFactory, Parser};

use restmode::cli::{Cli, Commands, Display, IpcClient};
use restmode::types::IpcResponse;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse();

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    // Set verbose logging if requested
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Daemon) => {
            restmode::daemon::run().await?;
        }
        Some(Commands::Status) => {
            let client = IpcClient::new()?;
            let response = ensure_success(client.status().await?)?;
            Display::show_status(&response);
        }
        Some(Commands::Break) => {
            let client = IpcClient::new()?;
            let response = ensure_success(client.start_break().await?)?;
            Display::show_success(&response);
        }
        Some(Commands::Postpone(args)) => {
            let client = IpcClient::new()?;
            let response = ensure_success(client.postpone(args.minutes).await?)?;
            Display::show_success(&response);
        }
        Some(Commands::Skip) => {
            let client = IpcClient::new()?;
            let response = ensure_success(client.skip().await?)?;
            Display::show_success(&response);
        }
        Some(Commands::Add(args)) => {
            let client = IpcClient::new()?;
            let response = ensure_success(client.add(args.minutes).await?)?;
            Display::show_success(&response);
        }
        Some(Commands::Reload) => {
            let client = IpcClient::new()?;
            let response = ensure_success(client.reload().await?)?;
            Display::show_success(&response);
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Turns a daemon-side error response into a CLI error.
fn ensure_success(response: IpcResponse) -> Result<IpcResponse> {
    if response.status == "error" {
        anyhow::bail!("{}", response.message);
    }
    Ok(response)
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
