//! Load command arguments

pub mod handler;

use std::path::PathBuf;

use clap::{Args, ValueEnum};

pub use handler::handle_load_command;

#[derive(Args, Debug, Clone)]
pub struct LoadCommands {
    /// Workbook to load (.xlsx, .xlsb, .xls or .ods)
    pub file: PathBuf,

    /// Target database name
    pub database: String,

    /// Drop the database first if it exists
    #[arg(long)]
    pub clean: bool,

    /// Create a named graph over the loaded edge collections
    #[arg(long, value_name = "NAME")]
    pub graph: Option<String>,

    /// Server endpoint (overrides config and ARANGO_ENDPOINT)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Username (overrides config and ARANGO_USERNAME)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Parse and map the workbook into an in-memory store; nothing is sent to the server
    #[arg(long)]
    pub dry_run: bool,

    /// Output format for the loaded documents
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Per-collection summary
    Table,
    /// All loaded documents as pretty JSON
    Json,
}
