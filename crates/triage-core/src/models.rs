//! Domain models for Triage

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::Profile;

/// Cadence at which a merchant's charges repeat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RecurrenceInterval {
    #[default]
    #[serde(rename = "N/A")]
    NotApplicable,
    Weekly,
    Monthly,
    Quarterly,
    #[serde(rename = "Bi-annually")]
    BiAnnually,
    Annually,
    #[serde(rename = "One-off")]
    OneOff,
}

impl RecurrenceInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotApplicable => "N/A",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::BiAnnually => "Bi-annually",
            Self::Annually => "Annually",
            Self::OneOff => "One-off",
        }
    }

    /// Confidence attached to a detected interval
    pub fn detection_confidence(&self) -> f64 {
        match self {
            Self::Monthly | Self::Annually => 0.9,
            Self::BiAnnually => 0.85,
            Self::Quarterly => 0.8,
            _ => 0.0,
        }
    }
}

impl std::str::FromStr for RecurrenceInterval {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "n/a" | "na" | "none" => Ok(Self::NotApplicable),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "bi-annually" | "biannually" | "semiannually" => Ok(Self::BiAnnually),
            "annually" | "yearly" => Ok(Self::Annually),
            "one-off" | "oneoff" | "once" => Ok(Self::OneOff),
            _ => Err(format!("Unknown recurrence interval: {}", s)),
        }
    }
}

impl std::fmt::Display for RecurrenceInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How strictly a rule (or a similarity query) matches names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Exact,
    #[default]
    Fuzzy,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
        }
    }
}

impl std::str::FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "fuzzy" => Ok(Self::Fuzzy),
            _ => Err(format!("Unknown match mode: {}", s)),
        }
    }
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Review state of a categorized transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriageStatus {
    Complete,
    #[serde(rename = "Pending Triage")]
    PendingTriage,
}

impl TriageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "Complete",
            Self::PendingTriage => "Pending Triage",
        }
    }
}

impl std::fmt::Display for TriageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which tier of the rule matcher produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Exact,
    Fuzzy,
}

/// An imported financial event
///
/// `date` is kept exactly as received; use [`RawTransaction::parsed_date`]
/// to interpret it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub id: i64,
    #[serde(alias = "merchant")]
    pub source_text: String,
    pub date: String,
    /// Negative = expense, positive = income
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    /// Clean name already resolved by an earlier classification
    #[serde(default)]
    pub clean_name: Option<String>,
    #[serde(default)]
    pub status: Option<TriageStatus>,
}

impl RawTransaction {
    pub fn new(id: i64, source_text: &str, date: &str, amount: f64) -> Self {
        Self {
            id,
            source_text: source_text.to_string(),
            date: date.to_string(),
            amount,
            ..Default::default()
        }
    }

    /// Parse the date in any of the formats bank exports commonly use
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    /// True once a transaction needs no further engine attention
    pub fn is_resolved(&self) -> bool {
        self.status == Some(TriageStatus::Complete)
            || self
                .clean_name
                .as_deref()
                .is_some_and(|name| !name.trim().is_empty())
    }
}

/// Parse a date string in various common formats
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%m-%d-%Y", // 01-15-2024
        "%d/%m/%Y", // 15/01/2024 (European)
    ];

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// First day of the date's own calendar month
pub fn budget_period(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
}

/// A user-managed pattern-to-outcome mapping
///
/// Rules are values: editing goes through the `with_*` methods, each of
/// which returns a new rule and leaves the original untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorizationRule {
    #[serde(default)]
    pub raw_pattern: String,
    #[serde(default)]
    pub clean_display_name: String,
    #[serde(default)]
    pub target_category: String,
    #[serde(default)]
    pub target_sub_category: Option<String>,
    /// `None` means the user never configured an interval
    #[serde(default)]
    pub recurrence_interval: Option<RecurrenceInterval>,
    #[serde(default)]
    pub default_planned_flag: Option<bool>,
    #[serde(default)]
    pub exclude_from_budget: bool,
    /// Matching transactions skip manual review
    #[serde(default)]
    pub auto_complete: bool,
    #[serde(default)]
    pub match_mode: MatchMode,
}

impl CategorizationRule {
    pub fn new(raw_pattern: &str, clean_display_name: &str, target_category: &str) -> Self {
        Self {
            raw_pattern: raw_pattern.to_string(),
            clean_display_name: clean_display_name.to_string(),
            target_category: target_category.to_string(),
            ..Default::default()
        }
    }

    /// A rule needs a pattern or a display name to match anything
    pub fn is_matchable(&self) -> bool {
        !self.raw_pattern.trim().is_empty() || !self.clean_display_name.trim().is_empty()
    }

    /// Name used by the fuzzy tier: the raw pattern, else the display name
    pub fn identifying_name(&self) -> &str {
        let pattern = self.raw_pattern.trim();
        if pattern.is_empty() {
            self.clean_display_name.trim()
        } else {
            pattern
        }
    }

    pub fn with_raw_pattern(self, raw_pattern: &str) -> Self {
        Self {
            raw_pattern: raw_pattern.to_string(),
            ..self
        }
    }

    pub fn with_clean_display_name(self, name: &str) -> Self {
        Self {
            clean_display_name: name.to_string(),
            ..self
        }
    }

    pub fn with_category(self, category: &str, sub_category: Option<&str>) -> Self {
        Self {
            target_category: category.to_string(),
            target_sub_category: sub_category.map(str::to_string),
            ..self
        }
    }

    pub fn with_recurrence(self, interval: RecurrenceInterval) -> Self {
        Self {
            recurrence_interval: Some(interval),
            ..self
        }
    }

    pub fn with_planned(self, planned: bool) -> Self {
        Self {
            default_planned_flag: Some(planned),
            ..self
        }
    }

    pub fn with_excluded(self, excluded: bool) -> Self {
        Self {
            exclude_from_budget: excluded,
            ..self
        }
    }

    pub fn with_auto_complete(self, auto_complete: bool) -> Self {
        Self {
            auto_complete,
            ..self
        }
    }

    pub fn with_match_mode(self, match_mode: MatchMode) -> Self {
        Self { match_mode, ..self }
    }
}

/// The engine's verdict for one raw transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizationResult {
    pub clean_name: String,
    pub category: String,
    pub sub_category: Option<String>,
    pub status: TriageStatus,
    pub confidence: f64,
    pub planned: bool,
    pub recurrence_interval: RecurrenceInterval,
    pub excluded: bool,
    /// `None` when the transaction date could not be parsed
    pub budget_period: Option<NaiveDate>,
    /// Position of the matching rule in the caller's rule list
    pub matched_rule: Option<usize>,
    pub tier: Option<MatchTier>,
}

impl CategorizationResult {
    /// Conservative result for a transaction no rule claims
    pub fn unmatched(clean_name: String, budget_period: Option<NaiveDate>) -> Self {
        Self {
            clean_name,
            category: String::new(),
            sub_category: None,
            status: TriageStatus::PendingTriage,
            confidence: 0.0,
            planned: true,
            recurrence_interval: RecurrenceInterval::NotApplicable,
            excluded: false,
            budget_period,
            matched_rule: None,
            tier: None,
        }
    }
}

/// A candidate rule discovered from transaction history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantSuggestion {
    pub candidate_name: String,
    pub occurrence_count: usize,
    pub dominant_category: String,
    pub dominant_sub_category: Option<String>,
    pub inferred_recurrence: RecurrenceInterval,
    /// Mean absolute amount across occurrences
    pub average_amount: f64,
    pub confidence_rank: f64,
}

impl MerchantSuggestion {
    /// Turn an accepted suggestion into a rule matching on its clean name
    pub fn into_rule(self) -> CategorizationRule {
        CategorizationRule {
            clean_display_name: self.candidate_name,
            target_category: self.dominant_category,
            target_sub_category: self.dominant_sub_category,
            recurrence_interval: Some(self.inferred_recurrence),
            ..Default::default()
        }
    }
}

/// What made a candidate similar to the reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    ExactName,
    ContainsName,
    AmountSimilarity,
    None,
}

/// Reference transaction for a similarity query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityReference {
    pub id: i64,
    /// Name to match against when the query gives no target name
    pub name: String,
    pub amount: f64,
}

impl From<&RawTransaction> for SimilarityReference {
    fn from(tx: &RawTransaction) -> Self {
        Self {
            id: tx.id,
            name: tx.source_text.clone(),
            amount: tx.amount,
        }
    }
}

/// A candidate ranked against a similarity reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatch {
    pub transaction_id: i64,
    /// Higher = more similar, unbounded
    pub score: f64,
    pub match_kind: MatchKind,
    pub profile: Profile,
}
