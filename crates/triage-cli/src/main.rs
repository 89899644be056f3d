//! Triage CLI - Transaction normalization and categorization
//!
//! Usage:
//!   triage clean "NETFLIX.COM 8887050800"           Show the cleaned name
//!   triage classify -t tx.json -r rules.json        Classify transactions
//!   triage scan -t tx.json                          Suggest rules
//!   triage similar -t tx.json --reference 1         Find similar transactions

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Clean {
            descriptions,
            filters,
        } => commands::cmd_clean(config_path, filters.as_deref(), &descriptions),
        Commands::Classify {
            transactions,
            rules,
            filters,
            chunk_size,
            json,
        } => {
            commands::cmd_classify(
                config_path,
                &transactions,
                &rules,
                filters.as_deref(),
                chunk_size,
                json,
            )
            .await
        }
        Commands::Scan {
            transactions,
            filters,
            limit,
            json,
        } => commands::cmd_scan(config_path, &transactions, filters.as_deref(), limit, json),
        Commands::Similar {
            transactions,
            reference,
            name,
            mode,
            profile,
            filters,
            json,
        } => {
            let mode: triage_core::MatchMode =
                mode.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let profile: triage_core::Profile =
                profile.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            commands::cmd_similar(
                config_path,
                &transactions,
                reference,
                name.as_deref(),
                mode,
                profile,
                filters.as_deref(),
                json,
            )
        }
        Commands::Rules { rules, action } => match action {
            None | Some(RulesAction::List) => commands::cmd_rules_list(&rules),
            Some(RulesAction::Test {
                description,
                filters,
            }) => commands::cmd_rules_test(config_path, &rules, filters.as_deref(), &description),
        },
        Commands::Config { action } => match action {
            None | Some(ConfigAction::Show) => commands::cmd_config_show(config_path),
            Some(ConfigAction::Path) => commands::cmd_config_path(),
        },
    }
}
