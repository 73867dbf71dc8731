//! Command-line interface for gatehouse.
//!
//! This module provides the CLI structure, output rendering and the
//! interactive menu for the `gatehouse` binary.

mod commands;
pub mod render;
pub mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DeleteCommand, JsonFlag, ListCommand, OutputFormat, RegisterCommand,
    ShowCommand, StatusCommand,
};

/// gatehouse - Visitor registration and parking status tracking
///
/// Register visitors at the gate, track whether they are still parked,
/// and see how much visitor parking is left.
#[derive(Debug, Parser)]
#[command(name = "gatehouse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register a new visitor
    Register(RegisterCommand),

    /// List all visitors, newest first
    List(ListCommand),

    /// Show one visitor
    Show(ShowCommand),

    /// Set a visitor's status to Active or Left
    Status(StatusCommand),

    /// Permanently delete a visitor
    Delete(DeleteCommand),

    /// Show parking occupancy
    Dashboard(JsonFlag),

    /// Check that the visitor store is reachable
    Health(JsonFlag),

    /// Interactive menu
    Shell,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Shell,
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "gatehouse");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        use crate::logging::Verbosity;

        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(3, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_register() {
        let cli = Cli::try_parse_from([
            "gatehouse",
            "register",
            "--name",
            "Alice",
            "--ic-number",
            "901231-14-5678",
            "--license-plate",
            "ABC1234",
            "--unit-number",
            "A-1-01",
        ])
        .unwrap();

        match cli.command {
            Command::Register(cmd) => {
                assert_eq!(cmd.name, "Alice");
                assert_eq!(cmd.unit_number, "A-1-01");
                assert!(!cmd.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_register_requires_all_fields() {
        let result = Cli::try_parse_from(["gatehouse", "register", "--name", "Alice"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_list_format() {
        let cli = Cli::try_parse_from(["gatehouse", "list", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List(ListCommand {
                format: OutputFormat::Json
            })
        ));

        let cli = Cli::try_parse_from(["gatehouse", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List(ListCommand {
                format: OutputFormat::Table
            })
        ));
    }

    #[test]
    fn test_parse_status_passes_text_through() {
        let cli = Cli::try_parse_from(["gatehouse", "status", "12", "Gone"]).unwrap();
        match cli.command {
            Command::Status(cmd) => {
                assert_eq!(cmd.id, 12);
                assert_eq!(cmd.status, "Gone");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_delete() {
        let cli = Cli::try_parse_from(["gatehouse", "delete", "3", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Delete(DeleteCommand { id: 3, yes: true })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli =
            Cli::try_parse_from(["gatehouse", "-c", "/custom/config.toml", "health"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(matches!(cli.command, Command::Health(_)));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = Cli::try_parse_from(["gatehouse", "config", "validate"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: None })
        ));
    }
}
