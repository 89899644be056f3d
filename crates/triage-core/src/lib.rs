//! Triage Core Library
//!
//! Transaction normalization and categorization engine for the Triage
//! budgeting tool:
//! - Merchant name cleaning with user-configurable noise filters
//! - Two-tier (exact, then fuzzy) rule matching over an ordered rule list
//! - Recurrence inference from occurrence dates
//! - Confidence scoring and ranking of discovered merchant patterns
//! - Similar-transaction lookup for applying a rule to history
//! - Chunked bulk classification with progress and cancellation
//! - JSON/text loaders for transactions, rules and noise filters
//!
//! Every engine operation is synchronous and pure over in-memory records.
//! Persistence and presentation belong to the caller.

pub mod batch;
pub mod clean;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod recurrence;
pub mod rules;
pub mod scoring;
pub mod similarity;
pub mod suggest;

pub use batch::{BatchClassifier, BatchOutcome, BatchProgressCallback, BatchSummary};
pub use clean::{clean, NameCleaner};
pub use config::{EngineConfig, Profile, ProfileThresholds};
pub use error::{Error, Result};
pub use models::{
    CategorizationResult, CategorizationRule, MatchKind, MatchMode, MatchTier, MerchantSuggestion,
    RawTransaction, RecurrenceInterval, SimilarityMatch, SimilarityReference, TriageStatus,
};
pub use recurrence::{detect, RecurrenceEstimate};
pub use rules::{classify, match_rule, RuleMatch, RuleMatcher};
pub use scoring::score;
pub use similarity::{find_similar, SimilarityMatcher};
pub use suggest::{scan_for_suggestions, SuggestionScanner};
