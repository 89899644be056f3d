//! Bulk classification command

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use triage_core::input::{load_rules, load_transactions};
use triage_core::{
    BatchClassifier, BatchOutcome, BatchProgressCallback, CategorizationRule, RawTransaction,
    RuleMatcher, TriageStatus,
};

use super::{build_matcher, load_config, truncate};

pub async fn cmd_classify(
    config_path: Option<&Path>,
    transactions_path: &Path,
    rules_path: &Path,
    filters_path: Option<&Path>,
    chunk_size: Option<usize>,
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
    let rules = load_rules(rules_path)
        .with_context(|| format!("Failed to load rules from {}", rules_path.display()))?;

    info!(
        "Classifying {} transactions against {} rules",
        transactions.len(),
        rules.len()
    );

    let chunk_size = chunk_size.unwrap_or(config.batch_chunk_size);
    let (transactions, outcome) = run_batch(matcher, rules, transactions, chunk_size).await?;

    if json {
        let output = serde_json::to_string_pretty(&outcome)?;
        println!("{}", output);
        return Ok(());
    }

    print_outcome(&transactions, &outcome);
    Ok(())
}

/// Run the batch off the async runtime, cancelling between chunks on Ctrl-C
pub async fn run_batch(
    matcher: RuleMatcher,
    rules: Vec<CategorizationRule>,
    transactions: Vec<RawTransaction>,
    chunk_size: usize,
) -> Result<(Vec<RawTransaction>, BatchOutcome)> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();

    let mut task = tokio::task::spawn_blocking(move || {
        let progress: BatchProgressCallback = Box::new(move |processed, total| {
            if processed < total {
                info!("Classified {}/{}", processed, total);
            }
        });
        let outcome = BatchClassifier::new(&matcher, &rules)
            .with_chunk_size(chunk_size)
            .classify_with_progress(&transactions, Some(&progress), Some(flag.as_ref()));
        (transactions, outcome)
    });

    let joined = tokio::select! {
        joined = &mut task => joined,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; stopping after the current chunk");
            cancel.store(true, Ordering::SeqCst);
            task.await
        }
    };

    joined.context("Classification task failed")
}

fn print_outcome(transactions: &[RawTransaction], outcome: &BatchOutcome) {
    let sources: HashMap<i64, &str> = transactions
        .iter()
        .map(|tx| (tx.id, tx.source_text.as_str()))
        .collect();

    println!();
    println!("🗂️  Classification Results");
    println!("   ─────────────────────────────────────────────────────────────");

    for (id, result) in &outcome.results {
        let status_icon = match result.status {
            TriageStatus::Complete => "✅",
            TriageStatus::PendingTriage => "📝",
        };
        let category = if result.category.is_empty() {
            "-".to_string()
        } else {
            match &result.sub_category {
                Some(sub) if !sub.is_empty() => format!("{} / {}", result.category, sub),
                _ => result.category.clone(),
            }
        };
        let period = result
            .budget_period
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_else(|| "?".to_string());

        println!(
            "   {} #{:<5} {:28} │ {:20} │ {:22} │ {:.1} │ {}",
            status_icon,
            id,
            truncate(sources.get(id).copied().unwrap_or(""), 28),
            truncate(&result.clean_name, 20),
            truncate(&category, 22),
            result.confidence,
            period
        );
    }

    let summary = &outcome.summary;
    println!();
    println!(
        "   {} processed: {} complete, {} pending triage ({} unmatched)",
        summary.processed, summary.complete, summary.pending_triage, summary.unmatched
    );
    if outcome.cancelled {
        println!(
            "   ⚠️  Cancelled: {} of {} transactions not classified",
            transactions.len() - summary.processed,
            transactions.len()
        );
    }
}
