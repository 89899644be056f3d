//! Merchant suggestion scan
//!
//! Groups unresolved transactions by cleaned merchant name, infers each
//! group's cadence and dominant category, scores it, and returns a ranked,
//! capped list of candidate rules.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::clean::NameCleaner;
use crate::config::{EngineConfig, Profile, ProfileThresholds, SuggestionThresholds};
use crate::models::{MerchantSuggestion, RawTransaction};
use crate::recurrence::{self, Band};
use crate::scoring;

/// Transactions sharing one cleaned name
#[derive(Debug, Default)]
struct MerchantGroup<'a> {
    name: String,
    members: Vec<&'a RawTransaction>,
}

/// Scans transaction history for merchants worth a rule
#[derive(Debug, Clone)]
pub struct SuggestionScanner {
    cleaner: NameCleaner,
    thresholds: SuggestionThresholds,
    bands: &'static [Band],
}

impl Default for SuggestionScanner {
    fn default() -> Self {
        Self::new(NameCleaner::default())
    }
}

impl SuggestionScanner {
    pub fn new(cleaner: NameCleaner) -> Self {
        Self {
            cleaner,
            thresholds: SuggestionThresholds::default(),
            bands: recurrence::bands_for(&ProfileThresholds::lenient()),
        }
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            cleaner: NameCleaner::with_prefixes(&config.noise_filters, &config.legacy_prefixes),
            thresholds: config.suggestions.clone(),
            bands: recurrence::bands_for(config.profile(Profile::Lenient)),
        }
    }

    /// Use a different cleaner, e.g. one carrying the user's noise filters
    pub fn with_cleaner(self, cleaner: NameCleaner) -> Self {
        Self { cleaner, ..self }
    }

    /// Override the number of suggestions returned
    pub fn with_limit(self, limit: usize) -> Self {
        Self {
            thresholds: SuggestionThresholds {
                limit,
                ..self.thresholds
            },
            ..self
        }
    }

    /// Ranked suggestions for unresolved merchants
    pub fn scan(&self, transactions: &[RawTransaction]) -> Vec<MerchantSuggestion> {
        let groups = self.group(transactions);
        let total_groups = groups.len();

        let suggestions: Vec<MerchantSuggestion> = groups
            .into_iter()
            .filter(|g| g.members.len() >= self.thresholds.min_occurrences)
            .map(|g| summarize(&g, self.bands))
            .collect();

        debug!(
            "{} merchant groups, {} with at least {} occurrences",
            total_groups,
            suggestions.len(),
            self.thresholds.min_occurrences
        );

        let mut ranked = scoring::rank(suggestions, self.thresholds.tie_window);
        ranked.truncate(self.thresholds.limit);

        info!("Merchant scan produced {} suggestions", ranked.len());
        ranked
    }

    /// Group unresolved transactions by case-insensitive cleaned name, in first-seen order
    fn group<'a>(&self, transactions: &'a [RawTransaction]) -> Vec<MerchantGroup<'a>> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<MerchantGroup<'a>> = Vec::new();

        for tx in transactions.iter().filter(|tx| !tx.is_resolved()) {
            let name = self.cleaner.clean(&tx.source_text);
            if name.is_empty() {
                continue;
            }

            let slot = *index.entry(name.to_lowercase()).or_insert_with(|| {
                groups.push(MerchantGroup {
                    name: name.clone(),
                    members: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].members.push(tx);
        }

        groups
    }
}

/// Most common value, earliest first appearance on ties
fn dominant<'a, I>(values: I) -> Option<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&'a str, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn summarize(group: &MerchantGroup<'_>, bands: &[Band]) -> MerchantSuggestion {
    let occurrence_count = group.members.len();

    let dates: Vec<_> = group
        .members
        .iter()
        .filter_map(|tx| tx.parsed_date())
        .collect();
    let estimate = recurrence::detect_with_bands(&dates, bands);

    let average_amount =
        group.members.iter().map(|tx| tx.amount.abs()).sum::<f64>() / occurrence_count as f64;

    let (dominant_category, category_count) =
        dominant(group.members.iter().filter_map(|tx| non_blank(&tx.category)))
            .unwrap_or(("", 0));

    let dominant_sub_category = dominant(
        group
            .members
            .iter()
            .filter(|tx| non_blank(&tx.category) == Some(dominant_category))
            .filter_map(|tx| non_blank(&tx.sub_category)),
    )
    .map(|(sub, _)| sub.to_string());

    let consistency = category_count as f64 / occurrence_count as f64;
    let confidence_rank = scoring::score(
        occurrence_count,
        estimate.interval,
        average_amount,
        consistency,
    );

    MerchantSuggestion {
        candidate_name: group.name.clone(),
        occurrence_count,
        dominant_category: dominant_category.to_string(),
        dominant_sub_category,
        inferred_recurrence: estimate.interval,
        average_amount,
        confidence_rank,
    }
}

/// Scan with default thresholds
pub fn scan_for_suggestions(transactions: &[RawTransaction]) -> Vec<MerchantSuggestion> {
    SuggestionScanner::default().scan(transactions)
}
