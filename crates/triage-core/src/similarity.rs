//! Similar-transaction lookup for bulk rule application
//!
//! When a rule is saved, the user picks which existing transactions it
//! should retroactively update. Candidates are scored on name similarity
//! (exact or contains) plus amount proximity to the reference.

use crate::clean::NameCleaner;
use crate::config::{EngineConfig, Profile, ProfileThresholds};
use crate::models::{MatchKind, MatchMode, RawTransaction, SimilarityMatch, SimilarityReference};

/// Ranks a transaction pool against a reference
#[derive(Debug, Clone)]
pub struct SimilarityMatcher {
    cleaner: NameCleaner,
    profile: Profile,
    thresholds: ProfileThresholds,
}

impl SimilarityMatcher {
    /// Matcher with the built-in thresholds for `profile`
    pub fn new(profile: Profile) -> Self {
        Self::with_config(&EngineConfig::default(), profile)
    }

    pub fn with_config(config: &EngineConfig, profile: Profile) -> Self {
        Self {
            cleaner: NameCleaner::with_prefixes(&config.noise_filters, &config.legacy_prefixes),
            profile,
            thresholds: config.profile(profile).clone(),
        }
    }

    pub fn with_cleaner(self, cleaner: NameCleaner) -> Self {
        Self { cleaner, ..self }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Candidates similar to `reference`, best first
    ///
    /// The reference itself (by id) is never returned. In exact mode only
    /// exact-name matches survive. A blank `target_name` falls back to the
    /// reference's own name.
    pub fn find_similar(
        &self,
        reference: &SimilarityReference,
        pool: &[RawTransaction],
        target_name: &str,
        mode: MatchMode,
    ) -> Vec<SimilarityMatch> {
        let target = match target_name.trim() {
            "" => reference.name.trim().to_lowercase(),
            name => name.to_lowercase(),
        };

        let mut matches: Vec<SimilarityMatch> = pool
            .iter()
            .filter(|tx| tx.id != reference.id)
            .filter_map(|tx| {
                let name_kind = self.name_kind(tx, &target);
                if mode == MatchMode::Exact && name_kind != MatchKind::ExactName {
                    return None;
                }

                let name_score = match name_kind {
                    MatchKind::ExactName => self.thresholds.exact_name_score,
                    MatchKind::ContainsName => self.thresholds.contains_name_score,
                    _ => 0.0,
                };
                let amount_score = self.amount_score(tx.amount, reference.amount);
                let score = name_score + amount_score;
                if score <= self.thresholds.score_floor {
                    return None;
                }

                let match_kind = match name_kind {
                    MatchKind::None if amount_score > 0.0 => MatchKind::AmountSimilarity,
                    kind => kind,
                };

                Some(SimilarityMatch {
                    transaction_id: tx.id,
                    score,
                    match_kind,
                    profile: self.profile,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches
    }

    /// Ids of the transactions `find_similar` returns, best first
    pub fn matching_ids(
        &self,
        reference: &SimilarityReference,
        pool: &[RawTransaction],
        target_name: &str,
        mode: MatchMode,
    ) -> Vec<i64> {
        self.find_similar(reference, pool, target_name, mode)
            .into_iter()
            .map(|m| m.transaction_id)
            .collect()
    }

    fn name_kind(&self, tx: &RawTransaction, target: &str) -> MatchKind {
        if target.is_empty() {
            return MatchKind::None;
        }

        let raw = tx.source_text.trim().to_lowercase();
        let cleaned = match tx.clean_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_lowercase(),
            _ => self.cleaner.clean(&tx.source_text).to_lowercase(),
        };

        if raw == target || cleaned == target {
            return MatchKind::ExactName;
        }

        let contains = |name: &str| {
            !name.is_empty() && (name.contains(target) || target.contains(name))
        };
        if contains(&raw) || contains(&cleaned) {
            MatchKind::ContainsName
        } else {
            MatchKind::None
        }
    }

    fn amount_score(&self, amount: f64, reference: f64) -> f64 {
        let diff = (amount - reference).abs();
        if diff <= self.thresholds.amount_exact_tolerance {
            self.thresholds.amount_exact_bonus
        } else if reference != 0.0 && diff / reference.abs() <= self.thresholds.amount_near_ratio {
            self.thresholds.amount_near_bonus
        } else {
            0.0
        }
    }
}

/// Find similar transactions with the built-in thresholds for `profile`
pub fn find_similar(
    reference: &SimilarityReference,
    pool: &[RawTransaction],
    target_name: &str,
    mode: MatchMode,
    profile: Profile,
) -> Vec<SimilarityMatch> {
    SimilarityMatcher::new(profile).find_similar(reference, pool, target_name, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Vec<RawTransaction> {
        vec![
            RawTransaction::new(1, "NETFLIX.COM", "2024-01-01", -99.0),
            RawTransaction::new(2, "NETFLIX.COM 8887050800", "2024-02-01", -99.0),
            RawTransaction::new(3, "NETFLIX GIFT CARD", "2024-02-15", -250.0),
            RawTransaction::new(4, "SPOTIFY", "2024-03-01", -99.02),
            RawTransaction::new(5, "HBO MAX", "2024-03-02", -105.0),
            RawTransaction::new(6, "NETTO", "2024-03-03", -400.0),
        ]
    }

    fn reference() -> SimilarityReference {
        SimilarityReference {
            id: 1,
            name: "NETFLIX.COM".to_string(),
            amount: -99.0,
        }
    }

    fn ids(matches: &[SimilarityMatch]) -> Vec<i64> {
        matches.iter().map(|m| m.transaction_id).collect()
    }

    #[test]
    fn test_reference_is_excluded() {
        for profile in [Profile::Strict, Profile::Lenient] {
            for mode in [MatchMode::Exact, MatchMode::Fuzzy] {
                let matches = find_similar(&reference(), &pool(), "Netflix", mode, profile);
                assert!(!ids(&matches).contains(&1));
            }
        }
    }

    #[test]
    fn test_strict_fuzzy_scoring() {
        let matches = find_similar(
            &reference(),
            &pool(),
            "Netflix",
            MatchMode::Fuzzy,
            Profile::Strict,
        );

        // 2: cleaned name exact + same amount; 3: contains; 4: same amount;
        // 5: within 10%, scores 10 and falls on the floor; 6: nothing
        assert_eq!(ids(&matches), vec![2, 3, 4]);
        assert_eq!(matches[0].score, 120.0);
        assert_eq!(matches[0].match_kind, MatchKind::ExactName);
        assert_eq!(matches[1].score, 50.0);
        assert_eq!(matches[1].match_kind, MatchKind::ContainsName);
        assert_eq!(matches[2].score, 20.0);
        assert_eq!(matches[2].match_kind, MatchKind::AmountSimilarity);
    }

    #[test]
    fn test_lenient_fuzzy_scoring() {
        let matches = find_similar(
            &reference(),
            &pool(),
            "Netflix",
            MatchMode::Fuzzy,
            Profile::Lenient,
        );

        assert_eq!(ids(&matches), vec![2, 3, 4, 5]);
        assert_eq!(matches[1].score, 60.0);
        assert_eq!(matches[3].score, 10.0);
        assert!(matches.iter().all(|m| m.profile == Profile::Lenient));
    }

    #[test]
    fn test_blank_target_uses_reference_name() {
        let matcher = SimilarityMatcher::new(Profile::Strict);
        let reference = SimilarityReference {
            name: "Netflix".to_string(),
            ..reference()
        };
        let blank = matcher.matching_ids(&reference, &pool(), "  ", MatchMode::Fuzzy);
        let named = matcher.matching_ids(&reference, &pool(), "Netflix", MatchMode::Fuzzy);
        assert_eq!(blank, named);
        assert_eq!(blank, vec![2, 3, 4]);
    }

    #[test]
    fn test_exact_mode_keeps_only_exact_names() {
        let matches = find_similar(
            &reference(),
            &pool(),
            "netflix",
            MatchMode::Exact,
            Profile::Lenient,
        );
        assert_eq!(ids(&matches), vec![2]);
    }

    #[test]
    fn test_raw_name_exact_match() {
        let matches = find_similar(
            &reference(),
            &pool(),
            "HBO MAX",
            MatchMode::Exact,
            Profile::Strict,
        );
        // Exact raw name plus an amount within 10%
        assert_eq!(ids(&matches), vec![5]);
        assert_eq!(matches[0].score, 110.0);
    }

    #[test]
    fn test_resolved_clean_name_is_used() {
        let mut tx = RawTransaction::new(9, "PAYMENT 7781 XYZ", "2024-01-01", -1.0);
        tx.clean_name = Some("Gym".to_string());
        let matches = find_similar(&reference(), &[tx], "gym", MatchMode::Exact, Profile::Strict);
        assert_eq!(ids(&matches), vec![9]);
    }

    #[test]
    fn test_empty_target_scores_amount_only() {
        let matches = find_similar(&reference(), &pool(), "", MatchMode::Fuzzy, Profile::Strict);
        assert_eq!(ids(&matches), vec![2, 4]);
        assert!(matches
            .iter()
            .all(|m| m.match_kind == MatchKind::AmountSimilarity));
    }

    #[test]
    fn test_zero_reference_amount() {
        let reference = SimilarityReference {
            id: 0,
            name: String::new(),
            amount: 0.0,
        };
        let pool = vec![RawTransaction::new(1, "A", "2024-01-01", 5.0)];
        let matches = find_similar(&reference, &pool, "", MatchMode::Fuzzy, Profile::Lenient);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_matching_ids() {
        let matcher = SimilarityMatcher::new(Profile::Strict);
        assert_eq!(matcher.profile(), Profile::Strict);
        assert_eq!(
            matcher.matching_ids(&reference(), &pool(), "Netflix", MatchMode::Fuzzy),
            vec![2, 3, 4]
        );
    }
}
