//! Engine configuration
//!
//! Every threshold the engine uses lives here, grouped by the concern that
//! reads it. Two named profiles carry the values that differ between the
//! merchant-rule flow (`strict`) and the transaction-dedup / merchant-scan
//! flow (`lenient`).
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/triage/config/engine.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

pub const EXACT_RULE_CONFIDENCE: f64 = 1.0;
pub const FUZZY_RULE_CONFIDENCE: f64 = 0.8;
pub const FUZZY_MIN_NAME_LEN: usize = 2;
pub const FUZZY_PREFIX_MIN_INPUT_LEN: usize = 3;

pub const SUGGESTION_LIMIT: usize = 20;
pub const SUGGESTION_TIE_WINDOW: f64 = 0.05;
pub const SUGGESTION_MIN_OCCURRENCES: usize = 2;

pub const BATCH_CHUNK_SIZE: usize = 500;

pub const EXACT_NAME_SCORE: f64 = 100.0;
pub const STRICT_CONTAINS_NAME_SCORE: f64 = 50.0;
pub const LENIENT_CONTAINS_NAME_SCORE: f64 = 60.0;
pub const STRICT_SCORE_FLOOR: f64 = 10.0;
pub const LENIENT_SCORE_FLOOR: f64 = 0.0;
pub const AMOUNT_EXACT_BONUS: f64 = 20.0;
pub const AMOUNT_NEAR_BONUS: f64 = 10.0;
/// Absolute difference (currency units) counted as the same amount
pub const AMOUNT_EXACT_TOLERANCE: f64 = 0.05;
/// Relative difference counted as a near amount
pub const AMOUNT_NEAR_RATIO: f64 = 0.10;

/// Payment-processor prefixes stripped from merchant names
pub const LEGACY_NOISE_PREFIXES: &[&str] = &[
    "PAYPAL *",
    "SUMUP *",
    "ZETTLE_*",
    "IZ *",
    "SQ *",
    "MOBILEPAY ",
    "DANKORT-NOTA ",
    "VISA/DANKORT ",
];

/// Threshold profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Merchant-rule editing: narrower name scoring, drops weak matches
    Strict,
    /// Transaction dedup and merchant scan: broader name scoring, Weekly recurrence
    #[default]
    Lenient,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            _ => Err(format!("Unknown profile: {}", s)),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Values that differ between the two profiles
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileThresholds {
    pub exact_name_score: f64,
    pub contains_name_score: f64,
    /// Candidates scoring at or below this are dropped
    pub score_floor: f64,
    pub amount_exact_bonus: f64,
    pub amount_near_bonus: f64,
    pub amount_exact_tolerance: f64,
    pub amount_near_ratio: f64,
    /// Recognize a 6–8 day Weekly band during recurrence detection
    pub weekly_band: bool,
}

impl ProfileThresholds {
    pub fn strict() -> Self {
        Self {
            exact_name_score: EXACT_NAME_SCORE,
            contains_name_score: STRICT_CONTAINS_NAME_SCORE,
            score_floor: STRICT_SCORE_FLOOR,
            amount_exact_bonus: AMOUNT_EXACT_BONUS,
            amount_near_bonus: AMOUNT_NEAR_BONUS,
            amount_exact_tolerance: AMOUNT_EXACT_TOLERANCE,
            amount_near_ratio: AMOUNT_NEAR_RATIO,
            weekly_band: false,
        }
    }

    pub fn lenient() -> Self {
        Self {
            contains_name_score: LENIENT_CONTAINS_NAME_SCORE,
            score_floor: LENIENT_SCORE_FLOOR,
            weekly_band: true,
            ..Self::strict()
        }
    }

    /// Built-in thresholds for a profile
    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Strict => Self::strict(),
            Profile::Lenient => Self::lenient(),
        }
    }
}

/// Rule matcher thresholds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleThresholds {
    pub exact_confidence: f64,
    pub fuzzy_confidence: f64,
    pub fuzzy_min_name_len: usize,
    pub fuzzy_prefix_min_input_len: usize,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            exact_confidence: EXACT_RULE_CONFIDENCE,
            fuzzy_confidence: FUZZY_RULE_CONFIDENCE,
            fuzzy_min_name_len: FUZZY_MIN_NAME_LEN,
            fuzzy_prefix_min_input_len: FUZZY_PREFIX_MIN_INPUT_LEN,
        }
    }
}

/// Merchant scan thresholds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionThresholds {
    /// Maximum number of suggestions returned
    pub limit: usize,
    /// Confidence gap within which average amount decides the order
    pub tie_window: f64,
    pub min_occurrences: usize,
}

impl Default for SuggestionThresholds {
    fn default() -> Self {
        Self {
            limit: SUGGESTION_LIMIT,
            tie_window: SUGGESTION_TIE_WINDOW,
            min_occurrences: SUGGESTION_MIN_OCCURRENCES,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineConfig {
    pub rules: RuleThresholds,
    pub suggestions: SuggestionThresholds,
    pub strict: ProfileThresholds,
    pub lenient: ProfileThresholds,
    pub legacy_prefixes: Vec<String>,
    /// Noise filters applied in addition to the caller's
    pub noise_filters: Vec<String>,
    pub batch_chunk_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rules: RuleThresholds::default(),
            suggestions: SuggestionThresholds::default(),
            strict: ProfileThresholds::strict(),
            lenient: ProfileThresholds::lenient(),
            legacy_prefixes: LEGACY_NOISE_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            noise_filters: Vec::new(),
            batch_chunk_size: BATCH_CHUNK_SIZE,
        }
    }
}

impl EngineConfig {
    /// Load from the default override location, else the embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit path (embedded defaults if it does not exist)
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse a TOML document on top of the built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Thresholds for a profile
    pub fn profile(&self, profile: Profile) -> &ProfileThresholds {
        match profile {
            Profile::Strict => &self.strict,
            Profile::Lenient => &self.lenient,
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("triage").join("config").join("engine.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<EngineConfig> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path);

    let content = match path {
        Some(path) if path.exists() => {
            debug!("Loading engine config from {}", path.display());
            fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?
        }
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    rules: Option<RawRules>,
    cleaning: Option<RawCleaning>,
    suggestions: Option<RawSuggestions>,
    batch: Option<RawBatch>,
    profiles: Option<RawProfiles>,
}

#[derive(Debug, Deserialize)]
struct RawRules {
    exact_confidence: Option<f64>,
    fuzzy_confidence: Option<f64>,
    fuzzy_min_name_len: Option<usize>,
    fuzzy_prefix_min_input_len: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawCleaning {
    legacy_prefixes: Option<Vec<String>>,
    noise_filters: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawSuggestions {
    limit: Option<usize>,
    tie_window: Option<f64>,
    min_occurrences: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawBatch {
    chunk_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawProfiles {
    strict: Option<RawProfile>,
    lenient: Option<RawProfile>,
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    exact_name_score: Option<f64>,
    contains_name_score: Option<f64>,
    score_floor: Option<f64>,
    amount_exact_bonus: Option<f64>,
    amount_near_bonus: Option<f64>,
    amount_exact_tolerance: Option<f64>,
    amount_near_ratio: Option<f64>,
    weekly_band: Option<bool>,
}

impl RawProfile {
    fn apply(self, target: &mut ProfileThresholds) {
        if let Some(v) = self.exact_name_score {
            target.exact_name_score = v;
        }
        if let Some(v) = self.contains_name_score {
            target.contains_name_score = v;
        }
        if let Some(v) = self.score_floor {
            target.score_floor = v;
        }
        if let Some(v) = self.amount_exact_bonus {
            target.amount_exact_bonus = v;
        }
        if let Some(v) = self.amount_near_bonus {
            target.amount_near_bonus = v;
        }
        if let Some(v) = self.amount_exact_tolerance {
            target.amount_exact_tolerance = v;
        }
        if let Some(v) = self.amount_near_ratio {
            target.amount_near_ratio = v;
        }
        if let Some(v) = self.weekly_band {
            target.weekly_band = v;
        }
    }
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    let mut config = EngineConfig::default();

    if let Some(rules) = raw.rules {
        if let Some(v) = rules.exact_confidence {
            config.rules.exact_confidence = v;
        }
        if let Some(v) = rules.fuzzy_confidence {
            config.rules.fuzzy_confidence = v;
        }
        if let Some(v) = rules.fuzzy_min_name_len {
            config.rules.fuzzy_min_name_len = v;
        }
        if let Some(v) = rules.fuzzy_prefix_min_input_len {
            config.rules.fuzzy_prefix_min_input_len = v;
        }
    }

    if let Some(cleaning) = raw.cleaning {
        if let Some(prefixes) = cleaning.legacy_prefixes {
            config.legacy_prefixes = prefixes;
        }
        if let Some(filters) = cleaning.noise_filters {
            config.noise_filters = filters;
        }
    }

    if let Some(suggestions) = raw.suggestions {
        if let Some(v) = suggestions.limit {
            config.suggestions.limit = v;
        }
        if let Some(v) = suggestions.tie_window {
            config.suggestions.tie_window = v;
        }
        if let Some(v) = suggestions.min_occurrences {
            config.suggestions.min_occurrences = v;
        }
    }

    if let Some(batch) = raw.batch {
        if let Some(v) = batch.chunk_size {
            if v == 0 {
                return Err(Error::Config("batch.chunk_size must be at least 1".into()));
            }
            config.batch_chunk_size = v;
        }
    }

    if let Some(profiles) = raw.profiles {
        if let Some(strict) = profiles.strict {
            strict.apply(&mut config.strict);
        }
        if let Some(lenient) = profiles.lenient {
            lenient.apply(&mut config.lenient);
        }
    }

    for (name, value) in [
        ("rules.exact_confidence", config.rules.exact_confidence),
        ("rules.fuzzy_confidence", config.rules.fuzzy_confidence),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::Config(format!(
                "{} must be between 0.0 and 1.0, got {}",
                name, value
            )));
        }
    }

    Ok(config)
}
