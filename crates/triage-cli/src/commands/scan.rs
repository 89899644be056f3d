//! Merchant suggestion command

use std::path::Path;

use anyhow::{Context, Result};
use triage_core::input::load_transactions;
use triage_core::{MerchantSuggestion, RawTransaction, SuggestionScanner};

use super::{build_matcher, load_config, truncate};

pub fn cmd_scan(
    config_path: Option<&Path>,
    transactions_path: &Path,
    filters_path: Option<&Path>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let matcher = build_matcher(&config, filters_path)?;
    let transactions = load_transactions(transactions_path).with_context(|| {
        format!(
            "Failed to load transactions from {}",
            transactions_path.display()
        )
    })?;

    let mut scanner =
        SuggestionScanner::with_config(&config).with_cleaner(matcher.cleaner().clone());
    if let Some(limit) = limit {
        scanner = scanner.with_limit(limit);
    }
    let suggestions = scanner.scan(&transactions);

    if json {
        let output = serde_json::to_string_pretty(&suggestions)?;
        println!("{}", output);
        return Ok(());
    }

    print_suggestions(&transactions, &suggestions);
    Ok(())
}

fn print_suggestions(transactions: &[RawTransaction], suggestions: &[MerchantSuggestion]) {
    if suggestions.is_empty() {
        let unresolved = transactions.iter().filter(|tx| !tx.is_resolved()).count();
        println!(
            "No merchants recur among {} unresolved transactions",
            unresolved
        );
        return;
    }

    println!();
    println!("💡 Suggested Rules");
    println!("   ─────────────────────────────────────────────────────────────");

    for s in suggestions {
        let category = if s.dominant_category.is_empty() {
            "?"
        } else {
            s.dominant_category.as_str()
        };
        println!(
            "   {:.2} │ {:24} │ {:>3}x │ {:>10.2} │ {:11} │ {}",
            s.confidence_rank,
            truncate(&s.candidate_name, 24),
            s.occurrence_count,
            s.average_amount,
            s.inferred_recurrence.as_str(),
            category
        );
    }
}
