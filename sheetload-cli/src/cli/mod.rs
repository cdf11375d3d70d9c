//! Command-line interface

pub mod commands;

use clap::Parser;
use log::LevelFilter;

use commands::load::LoadCommands;

/// Load a spreadsheet workbook into ArangoDB.
///
/// Every worksheet becomes a collection named after the sheet. Cell B1 holds
/// the collection type (`doc` or `edge`), B2/B3 the edge endpoints, row 5 the
/// property names and rows 6 onward the documents. Sheets starting with `.`
/// are skipped.
#[derive(Parser, Debug)]
#[command(name = "sheetload", version)]
pub struct Cli {
    #[command(flatten)]
    pub load: LoadCommands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::load::OutputFormat;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["sheetload", "data.xlsx", "mydb"]).unwrap();
        assert_eq!(cli.load.file.to_str(), Some("data.xlsx"));
        assert_eq!(cli.load.database, "mydb");
        assert!(!cli.load.clean);
        assert!(!cli.load.dry_run);
        assert_eq!(cli.load.format, OutputFormat::Table);
        assert_eq!(cli.log_level(), LevelFilter::Warn);
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "sheetload",
            "data.xlsx",
            "mydb",
            "--clean",
            "--graph",
            "social",
            "--endpoint",
            "http://db:8529",
            "-u",
            "loader",
            "--format",
            "json",
            "-vv",
        ])
        .unwrap();
        assert!(cli.load.clean);
        assert_eq!(cli.load.graph.as_deref(), Some("social"));
        assert_eq!(cli.load.endpoint.as_deref(), Some("http://db:8529"));
        assert_eq!(cli.load.username.as_deref(), Some("loader"));
        assert_eq!(cli.load.format, OutputFormat::Json);
        assert_eq!(cli.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn test_missing_database_is_rejected() {
        assert!(Cli::try_parse_from(["sheetload", "data.xlsx"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
