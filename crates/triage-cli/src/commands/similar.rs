//! Similar-transaction lookup command

use std::path::Path;

use anyhow::{Context, Result};
use triage_core::input::load_transactions;
use triage_core::{
    MatchKind, MatchMode, Profile, RawTransaction, SimilarityMatch, SimilarityMatcher,
    SimilarityReference,
};

use super::{build_matcher, load_config, truncate};

#[allow(clippy::too_many_arguments)]
pub fn cmd_similar(
    config_path: Option<&Path>,
    transactions_path: &Path,
    reference_id: i64,
    target_name: Option<&str>,
    mode: MatchMode,
    profile: Profile,
    filters_path: Option<&Path>,
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

    let reference_tx = transactions
        .iter()
        .find(|tx| tx.id == reference_id)
        .with_context(|| format!("Transaction #{} not found", reference_id))?;
    let reference = SimilarityReference::from(reference_tx);

    let target = match target_name {
        Some(name) => name.to_string(),
        None => matcher.clean(&reference_tx.source_text),
    };

    let similarity =
        SimilarityMatcher::with_config(&config, profile).with_cleaner(matcher.cleaner().clone());
    let matches = similarity.find_similar(&reference, &transactions, &target, mode);

    if json {
        let output = serde_json::to_string_pretty(&matches)?;
        println!("{}", output);
        return Ok(());
    }

    print_matches(&transactions, &reference, &target, profile, &matches);
    Ok(())
}

fn print_matches(
    transactions: &[RawTransaction],
    reference: &SimilarityReference,
    target: &str,
    profile: Profile,
    matches: &[SimilarityMatch],
) {
    if matches.is_empty() {
        println!(
            "No transactions similar to #{} (\"{}\", {} profile)",
            reference.id, target, profile
        );
        return;
    }

    println!();
    println!(
        "🔗 Similar to #{} \"{}\" ({:.2}, {} profile)",
        reference.id, target, reference.amount, profile
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for m in matches {
        let Some(tx) = transactions.iter().find(|tx| tx.id == m.transaction_id) else {
            continue;
        };
        let kind = match m.match_kind {
            MatchKind::ExactName => "exact",
            MatchKind::ContainsName => "contains",
            MatchKind::AmountSimilarity => "amount",
            MatchKind::None => "-",
        };
        println!(
            "   {:>5.0} │ #{:<5} {:30} │ {:>10.2} │ {}",
            m.score,
            tx.id,
            truncate(&tx.source_text, 30),
            tx.amount,
            kind
        );
    }
}
