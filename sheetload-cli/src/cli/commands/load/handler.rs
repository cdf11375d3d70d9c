//! Load command handler

use std::io::stdin;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::*;
use is_terminal::IsTerminal;
use log::{debug, info};

use super::{LoadCommands, OutputFormat};
use crate::api::{Connection, MemoryStore};
use crate::config::Config;
use crate::loader::{self, LoadOptions, LoadSummary};

/// Handle the load command
pub async fn handle_load_command(args: LoadCommands) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    if !args.file.exists() {
        anyhow::bail!("Workbook does not exist: {}", args.file.display());
    }

    let options = LoadOptions {
        clean: args.clean,
        graph: args.graph.clone(),
    };

    let summary = if args.dry_run {
        info!("Dry run: loading into an in-memory store");
        let store = Arc::new(MemoryStore::new());
        loader::load_with_store(store, &args.file, &args.database, &options).await
    } else {
        let connection = resolve_connection(&args)?;
        debug!(
            "Connecting to {} as {}",
            connection.endpoint, connection.credentials.username
        );
        loader::load(&args.file, &args.database, &connection, &options).await
    }
    .with_context(|| format!("Failed to load {}", args.file.display()))?;

    match args.format {
        OutputFormat::Table => print_table(&summary, args.dry_run),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&summary.collections)
                .context("Failed to format JSON output")?
        ),
    }

    if !summary.is_complete() {
        anyhow::bail!(
            "{} of {} worksheet(s) failed to load",
            summary.failures.len(),
            summary.sheet_count
        );
    }

    Ok(())
}

/// Merge config file, environment and flags; prompt for the password when it
/// is still unknown and we are attached to a terminal
fn resolve_connection(args: &LoadCommands) -> Result<Connection> {
    let mut config = Config::load(args.config.as_deref())?;

    if let Some(endpoint) = &args.endpoint {
        config.connection.endpoint = endpoint.clone();
    }
    if let Some(username) = &args.username {
        config.connection.username = username.clone();
    }

    let password = match config.connection.password.clone() {
        Some(password) => password,
        None if stdin().is_terminal() => rpassword::prompt_password(format!(
            "Password for {}@{}: ",
            config.connection.username, config.connection.endpoint
        ))
        .context("Failed to read password")?,
        None => String::new(),
    };

    Ok(config.connection.connection(password))
}

fn print_table(summary: &LoadSummary, dry_run: bool) {
    let target = if dry_run {
        format!("{} (dry run)", summary.db.name())
    } else {
        summary.db.name().to_string()
    };
    println!("Loaded into database {}", target.bright_green().bold());
    println!();

    for (name, documents) in &summary.collections {
        let kind = match summary
            .edge_definitions
            .iter()
            .find(|def| &def.collection == name)
        {
            Some(def) => format!(
                "edge {} -> {}",
                def.from.join(","),
                def.to.join(",")
            ),
            None => "document".to_string(),
        };
        println!(
            "  {:<24} {:>6} document(s)  {}",
            name.cyan(),
            documents.len(),
            kind.dimmed()
        );
    }

    if let Some(graph) = &summary.graph_created {
        println!();
        println!("Created graph {}", graph.bright_green());
    }

    if !summary.failures.is_empty() {
        println!();
        for failure in &summary.failures {
            println!(
                "  {} {}: {}",
                "failed".red().bold(),
                failure.sheet.yellow(),
                failure.error
            );
        }
    }

    println!();
    println!(
        "{} document(s) in {} collection(s)",
        summary.document_count(),
        summary.collections.len()
    );
}
