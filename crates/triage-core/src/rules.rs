//! Rule matching engine for transaction categorization
//!
//! Matching runs in two tiers over the caller's rule list:
//! 1. Exact: the rule's raw pattern equals the raw description, or its
//!    display name equals the cleaned name (case-insensitive).
//! 2. Fuzzy: for rules not pinned to exact mode, the rule's identifying name
//!    is a prefix of, or contained in, the raw or cleaned description (or the
//!    cleaned description is a prefix of the rule name).
//!
//! Within a tier the first rule in list order wins. The engine never sorts
//! rules; ordering is owned by the caller.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::clean::NameCleaner;
use crate::config::{EngineConfig, Profile, ProfileThresholds, RuleThresholds};
use crate::models::{
    budget_period, parse_date, CategorizationResult, CategorizationRule, MatchMode, MatchTier,
    RawTransaction, RecurrenceInterval, TriageStatus,
};
use crate::recurrence::{self, Band, RecurrenceEstimate};

/// A rule that matched a description, as reported by the rule tester
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleMatch {
    /// Position in the caller's rule list
    pub index: usize,
    pub tier: MatchTier,
    pub confidence: f64,
}

/// Lowercased forms of a description, computed once per lookup
struct Subject {
    raw: String,
    cleaned: String,
}

impl Subject {
    fn new(raw: &str, cleaned: &str) -> Self {
        Self {
            raw: raw.trim().to_lowercase(),
            cleaned: cleaned.to_lowercase(),
        }
    }
}

/// Categorizes transactions against an ordered rule list
#[derive(Debug, Clone)]
pub struct RuleMatcher {
    cleaner: NameCleaner,
    thresholds: RuleThresholds,
    /// Bands used when inferring a rule's interval from history
    interval_bands: &'static [Band],
}

impl Default for RuleMatcher {
    fn default() -> Self {
        Self::new(&[] as &[String])
    }
}

impl RuleMatcher {
    /// Create a matcher with default thresholds
    pub fn new<S: AsRef<str>>(noise_filters: &[S]) -> Self {
        Self {
            cleaner: NameCleaner::new(noise_filters),
            thresholds: RuleThresholds::default(),
            interval_bands: recurrence::bands_for(&ProfileThresholds::strict()),
        }
    }

    /// Create a matcher from engine config; config noise filters run before the caller's
    pub fn with_config<S: AsRef<str>>(config: &EngineConfig, noise_filters: &[S]) -> Self {
        let filters: Vec<&str> = config
            .noise_filters
            .iter()
            .map(String::as_str)
            .chain(noise_filters.iter().map(AsRef::as_ref))
            .collect();
        Self {
            cleaner: NameCleaner::with_prefixes(&filters, &config.legacy_prefixes),
            thresholds: config.rules.clone(),
            interval_bands: recurrence::bands_for(config.profile(Profile::Strict)),
        }
    }

    pub fn cleaner(&self) -> &NameCleaner {
        &self.cleaner
    }

    pub fn clean(&self, raw: &str) -> String {
        self.cleaner.clean(raw)
    }

    /// Classify an imported transaction
    pub fn classify(
        &self,
        transaction: &RawTransaction,
        rules: &[CategorizationRule],
    ) -> CategorizationResult {
        let date = transaction.parsed_date();
        if date.is_none() {
            debug!(
                "Transaction {} has unparseable date '{}'",
                transaction.id, transaction.date
            );
        }
        self.match_source(&transaction.source_text, date, rules)
    }

    /// Match a raw description against the rules
    pub fn match_source(
        &self,
        raw_source: &str,
        date: Option<NaiveDate>,
        rules: &[CategorizationRule],
    ) -> CategorizationResult {
        let cleaned = self.cleaner.clean(raw_source);
        let period = date.and_then(budget_period);

        match self.find_rule(raw_source, &cleaned, rules) {
            Some(found) => {
                let rule = &rules[found.index];
                debug!(
                    "Rule {} matched '{}' ({:?}, confidence {})",
                    found.index, raw_source, found.tier, found.confidence
                );
                build_result(rule, found, cleaned, period)
            }
            None => {
                debug!("No rule matched '{}' (cleaned '{}')", raw_source, cleaned);
                CategorizationResult::unmatched(cleaned, period)
            }
        }
    }

    /// First matching rule: exact tier across all rules, then fuzzy tier
    pub fn find_rule(
        &self,
        raw_source: &str,
        cleaned: &str,
        rules: &[CategorizationRule],
    ) -> Option<RuleMatch> {
        let subject = Subject::new(raw_source, cleaned);

        rules
            .iter()
            .position(|rule| rule.is_matchable() && is_exact_match(rule, &subject))
            .map(|index| RuleMatch {
                index,
                tier: MatchTier::Exact,
                confidence: self.thresholds.exact_confidence,
            })
            .or_else(|| {
                rules
                    .iter()
                    .position(|rule| rule.is_matchable() && self.is_fuzzy_match(rule, &subject))
                    .map(|index| RuleMatch {
                        index,
                        tier: MatchTier::Fuzzy,
                        confidence: self.thresholds.fuzzy_confidence,
                    })
            })
    }

    /// Every rule that would match, in list order, with its tier
    pub fn matching_rules(
        &self,
        raw_source: &str,
        rules: &[CategorizationRule],
    ) -> Vec<RuleMatch> {
        let cleaned = self.cleaner.clean(raw_source);
        let subject = Subject::new(raw_source, &cleaned);

        rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.is_matchable())
            .filter_map(|(index, rule)| {
                if is_exact_match(rule, &subject) {
                    Some(RuleMatch {
                        index,
                        tier: MatchTier::Exact,
                        confidence: self.thresholds.exact_confidence,
                    })
                } else if self.is_fuzzy_match(rule, &subject) {
                    Some(RuleMatch {
                        index,
                        tier: MatchTier::Fuzzy,
                        confidence: self.thresholds.fuzzy_confidence,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Infer a rule's interval from the history it would match
    ///
    /// Used to pre-fill the interval when a rule is being created. Only
    /// transactions this rule matches (in either tier) contribute; dates
    /// that fail to parse are ignored.
    pub fn infer_rule_interval(
        &self,
        rule: &CategorizationRule,
        history: &[RawTransaction],
    ) -> RecurrenceEstimate {
        let single = std::slice::from_ref(rule);
        let dates: Vec<NaiveDate> = history
            .iter()
            .filter(|tx| {
                let cleaned = self.cleaner.clean(&tx.source_text);
                self.find_rule(&tx.source_text, &cleaned, single).is_some()
            })
            .filter_map(|tx| parse_date(&tx.date))
            .collect();
        recurrence::detect_with_bands(&dates, self.interval_bands)
    }

    fn is_fuzzy_match(&self, rule: &CategorizationRule, subject: &Subject) -> bool {
        if rule.match_mode == MatchMode::Exact {
            return false;
        }

        let name = rule.identifying_name().to_lowercase();
        if name.chars().count() < self.thresholds.fuzzy_min_name_len {
            return false;
        }

        let cleaned_is_prefix = subject.cleaned.chars().count()
            > self.thresholds.fuzzy_prefix_min_input_len
            && name.starts_with(&subject.cleaned);

        subject.raw.starts_with(&name)
            || subject.cleaned.starts_with(&name)
            || cleaned_is_prefix
            || subject.raw.contains(&name)
            || subject.cleaned.contains(&name)
    }
}

fn is_exact_match(rule: &CategorizationRule, subject: &Subject) -> bool {
    let pattern = rule.raw_pattern.trim();
    let display = rule.clean_display_name.trim();

    (!pattern.is_empty() && pattern.to_lowercase() == subject.raw)
        || (!display.is_empty() && display.to_lowercase() == subject.cleaned)
}

fn build_result(
    rule: &CategorizationRule,
    found: RuleMatch,
    cleaned: String,
    period: Option<NaiveDate>,
) -> CategorizationResult {
    let display = rule.clean_display_name.trim();
    let clean_name = if display.is_empty() {
        cleaned
    } else {
        display.to_string()
    };

    let category = rule.target_category.trim().to_string();
    let sub_category = rule
        .target_sub_category
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    // A sub-category only blocks completion when the rule names one and it is blank
    let sub_category_ready = rule
        .target_sub_category
        .as_deref()
        .is_none_or(|s| !s.trim().is_empty());

    let excluded = rule.exclude_from_budget;
    let categorized = !category.is_empty() && sub_category_ready;
    let status = if rule.auto_complete && (excluded || categorized) {
        TriageStatus::Complete
    } else {
        TriageStatus::PendingTriage
    };

    let recurrence_interval = rule.recurrence_interval.unwrap_or(match found.tier {
        MatchTier::Exact => RecurrenceInterval::Monthly,
        MatchTier::Fuzzy => RecurrenceInterval::NotApplicable,
    });

    CategorizationResult {
        clean_name,
        category,
        sub_category,
        status,
        confidence: found.confidence,
        planned: rule.default_planned_flag.unwrap_or(true),
        recurrence_interval,
        excluded,
        budget_period: period,
        matched_rule: Some(found.index),
        tier: Some(found.tier),
    }
}

/// Classify one transaction with default thresholds
pub fn classify<S: AsRef<str>>(
    transaction: &RawTransaction,
    rules: &[CategorizationRule],
    noise_filters: &[S],
) -> CategorizationResult {
    RuleMatcher::new(noise_filters).classify(transaction, rules)
}

/// Match a raw description and date string with default thresholds
pub fn match_rule<S: AsRef<str>>(
    raw_source: &str,
    date: &str,
    rules: &[CategorizationRule],
    noise_filters: &[S],
) -> CategorizationResult {
    RuleMatcher::new(noise_filters).match_source(raw_source, parse_date(date), rules)
}
