//! Rule inspection commands

use std::path::Path;

use anyhow::{Context, Result};
use triage_core::input::load_rules;
use triage_core::{CategorizationRule, MatchTier};

use super::{build_matcher, load_config, truncate};

fn read_rules(rules_path: &Path) -> Result<Vec<CategorizationRule>> {
    load_rules(rules_path)
        .with_context(|| format!("Failed to load rules from {}", rules_path.display()))
}

pub fn cmd_rules_list(rules_path: &Path) -> Result<()> {
    let rules = read_rules(rules_path)?;

    if rules.is_empty() {
        println!("No rules in {}", rules_path.display());
        return Ok(());
    }

    println!();
    println!("📏 Rules (checked in this order)");
    println!("   ─────────────────────────────────────────────────────────────");

    for (index, rule) in rules.iter().enumerate() {
        let name = if rule.is_matchable() {
            rule.identifying_name()
        } else {
            "(never matches)"
        };
        let auto = if rule.auto_complete { " auto" } else { "" };
        println!(
            "   {:>3}. {:24} │ {:5} │ {:20}{}",
            index,
            truncate(name, 24),
            rule.match_mode.as_str(),
            truncate(&rule.target_category, 20),
            auto
        );
    }

    Ok(())
}

pub fn cmd_rules_test(
    config_path: Option<&Path>,
    rules_path: &Path,
    filters_path: Option<&Path>,
    description: &str,
) -> Result<()> {
    let config = load_config(config_path)?;
    let matcher = build_matcher(&config, filters_path)?;
    let rules = read_rules(rules_path)?;

    let matches = matcher.matching_rules(description, &rules);

    if matches.is_empty() {
        println!(
            "No rules match \"{}\" (cleaned: \"{}\")",
            description,
            matcher.clean(description)
        );
        return Ok(());
    }

    // The rule classification would pick: first exact, else first fuzzy
    let winner = matches
        .iter()
        .find(|m| m.tier == MatchTier::Exact)
        .or_else(|| matches.first())
        .map(|m| m.index);

    println!();
    println!("🔍 Rules matching \"{}\":", description);
    println!("   ─────────────────────────────────────────────────────────────");

    for m in &matches {
        let rule = &rules[m.index];
        let marker = if Some(m.index) == winner { "→" } else { " " };
        let tier = match m.tier {
            MatchTier::Exact => "exact",
            MatchTier::Fuzzy => "fuzzy",
        };
        println!(
            "   {} Rule {} ({}, {:.1}) -> {} ({})",
            marker,
            m.index,
            tier,
            m.confidence,
            rule.target_category,
            rule.identifying_name()
        );
    }

    Ok(())
}
