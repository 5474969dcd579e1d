//! Command definitions for the RestMode CLI.
//!
//! Uses clap derive macro for argument parsing.

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// RestMode - a break reminder for long work sessions
#[derive(Parser, Debug)]
#[command(
    name = "restmode",
    version,
    about = "macOS向け休憩リマインダーCLI",
    long_about = "一定時間ごとに休憩を促す常駐デーモンとそのクライアント。\n\
                  macOSのネイティブ通知とサウンドで休憩のタイミングを知らせます。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the break reminder daemon in the foreground
    Daemon,

    /// Show the current break schedule
    Status,

    /// Start a break right now
    Break,

    /// Postpone the current break
    Postpone(PostponeArgs),

    /// Skip the current break entirely
    Skip,

    /// Extend the current work interval
    Add(AddArgs),

    /// Re-read the settings file and apply it
    Reload,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Command Arguments
// ============================================================================

/// Arguments for the postpone command
#[derive(Args, Debug, Clone)]
pub struct PostponeArgs {
    /// Minutes of work before the break comes back (1-480)
    #[arg(
        short,
        long,
        default_value = "5",
        value_parser = clap::value_parser!(u32).range(1..=480)
    )]
    pub minutes: u32,
}

/// Arguments for the add command
#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Minutes to add before the next break (1-480)
    #[arg(
        short,
        long,
        default_value = "10",
        value_parser = clap::value_parser!(u32).range(1..=480)
    )]
    pub minutes: u32,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_status() {
        let cli = Cli::try_parse_from(["restmode", "status"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Status)));
    }

    #[test]
    fn test_parse_postpone_default_minutes() {
        let cli = Cli::try_parse_from(["restmode", "postpone"]).unwrap();
        match cli.command {
            Some(Commands::Postpone(args)) => assert_eq!(args.minutes, 5),
            _ => panic!("Expected postpone command"),
        }
    }

    #[test]
    fn test_parse_postpone_custom_minutes() {
        let cli = Cli::try_parse_from(["restmode", "postpone", "--minutes", "15"]).unwrap();
        match cli.command {
            Some(Commands::Postpone(args)) => assert_eq!(args.minutes, 15),
            _ => panic!("Expected postpone command"),
        }
    }

    #[test]
    fn test_parse_postpone_rejects_zero() {
        assert!(Cli::try_parse_from(["restmode", "postpone", "-m", "0"]).is_err());
    }

    #[test]
    fn test_parse_postpone_rejects_out_of_range() {
        assert!(Cli::try_parse_from(["restmode", "postpone", "-m", "481"]).is_err());
    }

    #[test]
    fn test_parse_add_default_minutes() {
        let cli = Cli::try_parse_from(["restmode", "add"]).unwrap();
        match cli.command {
            Some(Commands::Add(args)) => assert_eq!(args.minutes, 10),
            _ => panic!("Expected add command"),
        }
    }

    #[test]
    fn test_parse_verbose_flag_is_global() {
        let cli = Cli::try_parse_from(["restmode", "status", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_parse_no_command() {
        let cli = Cli::try_parse_from(["restmode"]).unwrap();
        assert!(cli.command.is_none());
    }
}
