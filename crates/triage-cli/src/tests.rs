//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use triage_core::{MatchMode, Profile, RuleMatcher, TriageStatus};

use crate::commands::{self, truncate};

const TRANSACTIONS: &str = r#"[
    {"id": 1, "source_text": "NETFLIX.COM 8887050800", "date": "2024-01-03", "amount": -99},
    {"id": 2, "source_text": "NETFLIX.COM 8887050800", "date": "2024-02-03", "amount": -99},
    {"id": 3, "source_text": "NETFLIX.COM 8887050800", "date": "2024-03-03", "amount": -99},
    {"id": 4, "source_text": "NETTO CITY NOTA", "date": "2024-01-04", "amount": -212.5, "category": "Groceries"},
    {"id": 5, "source_text": "NETTO CITY NOTA", "date": "2024-01-11", "amount": -87.25, "category": "Groceries"},
    {"id": 6, "source_text": "UBER TRIP", "date": "31/01/2024", "amount": -180}
]"#;

const RULES: &str = r#"[
    {"raw_pattern": "NETFLIX.COM", "clean_display_name": "Netflix",
     "target_category": "Entertainment", "auto_complete": true},
    {"raw_pattern": "uber", "target_category": "Transport"}
]"#;

struct Inputs {
    _dir: TempDir,
    transactions: PathBuf,
    rules: PathBuf,
    filters: PathBuf,
    config: PathBuf,
}

fn setup_inputs() -> Inputs {
    let dir = tempfile::tempdir().unwrap();
    let transactions = dir.path().join("transactions.json");
    let rules = dir.path().join("rules.json");
    let filters = dir.path().join("filters.txt");
    let config = dir.path().join("engine.toml");

    fs::write(&transactions, TRANSACTIONS).unwrap();
    fs::write(&rules, RULES).unwrap();
    fs::write(&filters, "# bank noise\nCITY NOTA\n").unwrap();
    fs::write(&config, "[suggestions]\nlimit = 5\n").unwrap();

    Inputs {
        _dir: dir,
        transactions,
        rules,
        filters,
        config,
    }
}

// ========== Shared Loader Tests ==========

#[test]
fn test_load_config_explicit_path() {
    let inputs = setup_inputs();
    let config = commands::load_config(Some(&inputs.config)).unwrap();
    assert_eq!(config.suggestions.limit, 5);
}

#[test]
fn test_load_config_missing_path_fails() {
    let result = commands::load_config(Some(Path::new("/nonexistent/engine.toml")));
    assert!(result.is_err());
}

#[test]
fn test_load_filters() {
    let inputs = setup_inputs();
    assert_eq!(
        commands::load_filters(Some(&inputs.filters)).unwrap(),
        vec!["CITY NOTA".to_string()]
    );
    assert!(commands::load_filters(None).unwrap().is_empty());
}

#[test]
fn test_build_matcher_uses_filter_file() {
    let inputs = setup_inputs();
    let config = commands::load_config(Some(&inputs.config)).unwrap();
    let matcher = commands::build_matcher(&config, Some(&inputs.filters)).unwrap();
    assert_eq!(matcher.clean("NETTO CITY NOTA"), "NETTO");
}

// ========== Command Tests ==========

#[test]
fn test_cmd_clean() {
    let inputs = setup_inputs();
    let result = commands::cmd_clean(
        Some(&inputs.config),
        Some(&inputs.filters),
        &["NETFLIX.COM 8887050800".to_string(), "12345".to_string()],
    );
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_classify() {
    let inputs = setup_inputs();
    let result = commands::cmd_classify(
        Some(&inputs.config),
        &inputs.transactions,
        &inputs.rules,
        Some(&inputs.filters),
        Some(2),
        false,
    )
    .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_classify_missing_rules_file() {
    let inputs = setup_inputs();
    let result = commands::cmd_classify(
        Some(&inputs.config),
        &inputs.transactions,
        Path::new("/nonexistent/rules.json"),
        None,
        None,
        true,
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_run_batch_completes() {
    let transactions =
        triage_core::input::parse_transactions(TRANSACTIONS.as_bytes()).unwrap();
    let rules = triage_core::input::parse_rules(RULES.as_bytes()).unwrap();

    let (returned, outcome) =
        commands::run_batch(RuleMatcher::new(&["CITY NOTA"]), rules, transactions, 4)
            .await
            .unwrap();

    assert_eq!(returned.len(), 6);
    assert!(!outcome.cancelled);
    assert_eq!(outcome.summary.processed, 6);
    assert_eq!(outcome.summary.complete, 3);

    let (_, uber) = &outcome.results[5];
    assert_eq!(uber.category, "Transport");
    assert_eq!(uber.status, TriageStatus::PendingTriage);
    assert!(uber.budget_period.is_some());
}

#[test]
fn test_cmd_scan() {
    let inputs = setup_inputs();
    let result = commands::cmd_scan(
        Some(&inputs.config),
        &inputs.transactions,
        Some(&inputs.filters),
        Some(3),
        false,
    );
    assert!(result.is_ok());
}

#[test]
fn test_cmd_similar() {
    let inputs = setup_inputs();
    let result = commands::cmd_similar(
        Some(&inputs.config),
        &inputs.transactions,
        1,
        Some("Netflix"),
        MatchMode::Exact,
        Profile::Strict,
        None,
        false,
    );
    assert!(result.is_ok());
}

#[test]
fn test_cmd_similar_unknown_reference() {
    let inputs = setup_inputs();
    let result = commands::cmd_similar(
        Some(&inputs.config),
        &inputs.transactions,
        99,
        None,
        MatchMode::Fuzzy,
        Profile::Lenient,
        None,
        true,
    );
    assert!(result.is_err());
}

#[test]
fn test_cmd_rules_list() {
    let inputs = setup_inputs();
    assert!(commands::cmd_rules_list(&inputs.rules).is_ok());
}

#[test]
fn test_cmd_rules_test() {
    let inputs = setup_inputs();
    let result = commands::cmd_rules_test(
        Some(&inputs.config),
        &inputs.rules,
        None,
        "NETFLIX.COM 8887050800",
    );
    assert!(result.is_ok());

    let result = commands::cmd_rules_test(Some(&inputs.config), &inputs.rules, None, "XKQJ");
    assert!(result.is_ok());
}

#[test]
fn test_cmd_rules_malformed_file() {
    let inputs = setup_inputs();
    fs::write(&inputs.rules, "{ not json").unwrap();
    assert!(commands::cmd_rules_list(&inputs.rules).is_err());
}

#[test]
fn test_cmd_config_show() {
    let inputs = setup_inputs();
    assert!(commands::cmd_config_show(Some(&inputs.config)).is_ok());
}

#[test]
fn test_cmd_config_path() {
    assert!(commands::cmd_config_path().is_ok());
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is too long", 10), "this is...");
    assert_eq!(truncate("bagerbrød og kaffe", 10), "bagerbr...");
}
