//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::visitor::{NewVisitor, VisitorId};

/// Register command arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Visitor's name
    #[arg(short, long)]
    pub name: String,

    /// Identity card number (must be unique)
    #[arg(short, long)]
    pub ic_number: String,

    /// Vehicle license plate (must be unique)
    #[arg(short, long)]
    pub license_plate: String,

    /// Unit being visited
    #[arg(short, long)]
    pub unit_number: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl RegisterCommand {
    /// The registration request described by these arguments.
    #[must_use]
    pub fn to_request(&self) -> NewVisitor {
        NewVisitor::new(
            self.name.clone(),
            self.ic_number.clone(),
            self.license_plate.clone(),
            self.unit_number.clone(),
        )
    }
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Visitor id
    pub id: i64,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl ShowCommand {
    /// The visitor id.
    #[must_use]
    pub fn visitor_id(&self) -> VisitorId {
        VisitorId::new(self.id)
    }
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Visitor id
    pub id: i64,

    /// New status: Active or Left
    pub status: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl StatusCommand {
    /// The visitor id.
    #[must_use]
    pub fn visitor_id(&self) -> VisitorId {
        VisitorId::new(self.id)
    }
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Visitor id
    pub id: i64,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl DeleteCommand {
    /// The visitor id.
    #[must_use]
    pub fn visitor_id(&self) -> VisitorId {
        VisitorId::new(self.id)
    }
}

/// Arguments for commands whose only option is JSON output.
#[derive(Debug, Args)]
pub struct JsonFlag {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per visitor
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
