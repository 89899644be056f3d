//! Suggestion confidence scoring and ranking

use crate::models::{MerchantSuggestion, RecurrenceInterval};

pub const PATTERN_WEIGHT: f64 = 0.4;
pub const AMOUNT_WEIGHT: f64 = 0.3;
pub const FREQUENCY_WEIGHT: f64 = 0.2;
pub const CONSISTENCY_WEIGHT: f64 = 0.1;

/// Occurrence count at which the frequency sub-score saturates
pub const FREQUENCY_SATURATION: f64 = 4.0;

/// Slack on the tie window so that gaps equal to it in decimal (0.62 vs
/// 0.57) are not pushed out by binary rounding
pub const TIE_TOLERANCE: f64 = 1e-9;

/// Inputs to the confidence formula for one merchant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub occurrence_count: usize,
    pub interval: RecurrenceInterval,
    pub average_amount: f64,
    /// Fraction of occurrences sharing the most common category
    pub category_consistency: f64,
}

/// Confidence that a merchant pattern deserves a rule, in `[0, 1]`
pub fn score(
    occurrence_count: usize,
    interval: RecurrenceInterval,
    average_amount: f64,
    category_consistency: f64,
) -> f64 {
    let total = PATTERN_WEIGHT * pattern_score(occurrence_count, interval)
        + AMOUNT_WEIGHT * amount_score(average_amount)
        + FREQUENCY_WEIGHT * frequency_score(occurrence_count)
        + CONSISTENCY_WEIGHT * consistency_score(category_consistency);
    total.clamp(0.0, 1.0)
}

/// Score a bundle of inputs
pub fn score_inputs(inputs: &ScoreInputs) -> f64 {
    score(
        inputs.occurrence_count,
        inputs.interval,
        inputs.average_amount,
        inputs.category_consistency,
    )
}

pub fn pattern_score(occurrence_count: usize, interval: RecurrenceInterval) -> f64 {
    match interval {
        RecurrenceInterval::Monthly => 1.0,
        RecurrenceInterval::Weekly | RecurrenceInterval::Quarterly => 0.8,
        // Frequent but irregular
        RecurrenceInterval::NotApplicable if occurrence_count > 2 => 0.4,
        _ => 0.0,
    }
}

pub fn amount_score(average_amount: f64) -> f64 {
    let magnitude = average_amount.abs();
    if magnitude > 5000.0 {
        1.0
    } else if magnitude > 1000.0 {
        0.8
    } else if magnitude > 100.0 {
        0.5
    } else {
        0.2
    }
}

pub fn frequency_score(occurrence_count: usize) -> f64 {
    (occurrence_count as f64 / FREQUENCY_SATURATION).min(1.0)
}

pub fn consistency_score(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Order suggestions for display
///
/// Confidence descends, except that within `tie_window` of the best
/// remaining confidence the highest average amount goes first. For every
/// pair where A precedes B, either A is more confident or the two are
/// within the window (inclusive, up to `TIE_TOLERANCE`) and A's average
/// amount is at least B's.
pub fn rank(mut suggestions: Vec<MerchantSuggestion>, tie_window: f64) -> Vec<MerchantSuggestion> {
    suggestions.sort_by(|a, b| {
        b.confidence_rank
            .total_cmp(&a.confidence_rank)
            .then_with(|| b.average_amount.total_cmp(&a.average_amount))
    });

    let mut ranked = Vec::with_capacity(suggestions.len());
    while !suggestions.is_empty() {
        let top = suggestions[0].confidence_rank;
        let window_end = suggestions
            .iter()
            .position(|s| top - s.confidence_rank > tie_window + TIE_TOLERANCE)
            .unwrap_or(suggestions.len());

        // Earliest maximum amount within the window
        let mut pick = 0;
        for (i, candidate) in suggestions[..window_end].iter().enumerate().skip(1) {
            if candidate.average_amount > suggestions[pick].average_amount {
                pick = i;
            }
        }
        ranked.push(suggestions.remove(pick));
    }
    ranked
}
