//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

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
    /// Roll number of the student
    pub roll: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Unique roll number
    #[arg(short, long)]
    pub roll: String,

    /// Student name
    #[arg(short, long)]
    pub name: String,

    /// Class or section
    #[arg(short = 'k', long)]
    pub class: String,

    /// Mark for one subject, as SUBJECT=VALUE (repeat for every subject)
    #[arg(short, long = "mark", value_name = "SUBJECT=VALUE", required = true)]
    pub marks: Vec<String>,
}

/// Update command arguments.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Roll number of the student
    pub roll: String,

    /// New mark for one subject, as SUBJECT=VALUE; other subjects are kept
    #[arg(short, long = "mark", value_name = "SUBJECT=VALUE")]
    pub marks: Vec<String>,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Roll number of the student
    pub roll: String,
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
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
