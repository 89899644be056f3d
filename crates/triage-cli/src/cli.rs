//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Triage - Clean, categorize and triage bank transactions
#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Transaction normalization and categorization engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Engine config file (defaults to the user config, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the cleaned merchant name for one or more descriptions
    Clean {
        /// Raw bank descriptions
        #[arg(required = true)]
        descriptions: Vec<String>,

        /// Noise filter file (one filter per line)
        #[arg(long)]
        filters: Option<PathBuf>,
    },

    /// Classify transactions against a rule list
    Classify {
        /// Transactions JSON file
        #[arg(short, long)]
        transactions: PathBuf,

        /// Rules JSON file
        #[arg(short, long)]
        rules: PathBuf,

        /// Noise filter file (one filter per line)
        #[arg(long)]
        filters: Option<PathBuf>,

        /// Transactions per chunk (defaults to config)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest rules for recurring, unresolved merchants
    Scan {
        /// Transactions JSON file
        #[arg(short, long)]
        transactions: PathBuf,

        /// Noise filter file (one filter per line)
        #[arg(long)]
        filters: Option<PathBuf>,

        /// Maximum suggestions (defaults to config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print suggestions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find transactions similar to a reference transaction
    Similar {
        /// Transactions JSON file
        #[arg(short, long)]
        transactions: PathBuf,

        /// Reference transaction ID
        #[arg(long)]
        reference: i64,

        /// Target name to match (defaults to the reference's cleaned name)
        #[arg(long)]
        name: Option<String>,

        /// Match mode: exact or fuzzy
        #[arg(long, default_value = "fuzzy")]
        mode: String,

        /// Threshold profile: strict or lenient
        #[arg(long, default_value = "lenient")]
        profile: String,

        /// Noise filter file (one filter per line)
        #[arg(long)]
        filters: Option<PathBuf>,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect a rule list
    Rules {
        /// Rules JSON file
        #[arg(short, long)]
        rules: PathBuf,

        #[command(subcommand)]
        action: Option<RulesAction>,
    },

    /// Show engine configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum RulesAction {
    /// List rules in match order
    List,

    /// Test which rules match a description
    Test {
        /// Description to test
        description: String,

        /// Noise filter file (one filter per line)
        #[arg(long)]
        filters: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Show the user config override path
    Path,
}
