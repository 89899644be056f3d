//! Bulk classification in chunks
//!
//! Large imports are classified a chunk at a time so the caller can report
//! progress and cancel between chunks. A chunk, once started, always runs
//! to completion.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::BATCH_CHUNK_SIZE;
use crate::models::{CategorizationResult, CategorizationRule, RawTransaction, TriageStatus};
use crate::rules::RuleMatcher;

/// Progress callback for batch classification
/// Parameters: (processed, total)
pub type BatchProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Counts for a batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub complete: usize,
    pub pending_triage: usize,
    pub unmatched: usize,
}

/// Results of a batch run, possibly cut short by cancellation
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    /// One result per processed transaction, in input order
    pub results: Vec<(i64, CategorizationResult)>,
    pub summary: BatchSummary,
    pub cancelled: bool,
}

/// Classifies transactions in chunks against a fixed rule list
pub struct BatchClassifier<'a> {
    matcher: &'a RuleMatcher,
    rules: &'a [CategorizationRule],
    chunk_size: usize,
}

impl<'a> BatchClassifier<'a> {
    pub fn new(matcher: &'a RuleMatcher, rules: &'a [CategorizationRule]) -> Self {
        Self {
            matcher,
            rules,
            chunk_size: BATCH_CHUNK_SIZE,
        }
    }

    /// Set the chunk size (values below 1 are treated as 1)
    pub fn with_chunk_size(self, chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            ..self
        }
    }

    /// Classify everything without progress reporting or cancellation
    pub fn classify_all(&self, transactions: &[RawTransaction]) -> BatchOutcome {
        self.classify_with_progress(transactions, None, None)
    }

    /// Classify in chunks, reporting after each chunk and checking `cancel` between chunks
    pub fn classify_with_progress(
        &self,
        transactions: &[RawTransaction],
        progress: Option<&BatchProgressCallback>,
        cancel: Option<&AtomicBool>,
    ) -> BatchOutcome {
        let total = transactions.len();
        let mut outcome = BatchOutcome {
            results: Vec::with_capacity(total),
            summary: BatchSummary::default(),
            cancelled: false,
        };

        for chunk in transactions.chunks(self.chunk_size) {
            if cancel.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
                info!(
                    "Batch classification cancelled after {} of {} transactions",
                    outcome.summary.processed, total
                );
                outcome.cancelled = true;
                return outcome;
            }

            for tx in chunk {
                let result = self.matcher.classify(tx, self.rules);
                record(&mut outcome.summary, &result);
                outcome.results.push((tx.id, result));
            }

            debug!("Classified {}/{}", outcome.summary.processed, total);
            if let Some(cb) = progress {
                cb(outcome.summary.processed, total);
            }
        }

        info!(
            "Classified {} transactions: {} complete, {} pending triage ({} unmatched)",
            outcome.summary.processed,
            outcome.summary.complete,
            outcome.summary.pending_triage,
            outcome.summary.unmatched
        );
        outcome
    }
}

fn record(summary: &mut BatchSummary, result: &CategorizationResult) {
    summary.processed += 1;
    match result.status {
        TriageStatus::Complete => summary.complete += 1,
        TriageStatus::PendingTriage => summary.pending_triage += 1,
    }
    if result.matched_rule.is_none() {
        summary.unmatched += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn transactions(count: usize) -> Vec<RawTransaction> {
        (0..count)
            .map(|i| {
                let source = if i % 2 == 0 { "NETFLIX.COM" } else { "CORNER SHOP" };
                RawTransaction::new(i as i64, source, "2024-01-15", -10.0)
            })
            .collect()
    }

    fn rules() -> Vec<CategorizationRule> {
        vec![CategorizationRule::new("NETFLIX.COM", "Netflix", "Entertainment").with_auto_complete(true)]
    }

    #[test]
    fn test_classify_all_summary() {
        let matcher = RuleMatcher::default();
        let rules = rules();
        let outcome = BatchClassifier::new(&matcher, &rules).classify_all(&transactions(5));

        assert!(!outcome.cancelled);
        assert_eq!(
            outcome.summary,
            BatchSummary {
                processed: 5,
                complete: 3,
                pending_triage: 2,
                unmatched: 2,
            }
        );
        let ids: Vec<i64> = outcome.results.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_progress_reported_per_chunk() {
        let matcher = RuleMatcher::default();
        let rules = rules();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let progress: BatchProgressCallback = Box::new(move |processed, total| {
            seen.fetch_add(1, Ordering::SeqCst);
            assert!(processed <= total);
        });

        let outcome = BatchClassifier::new(&matcher, &rules)
            .with_chunk_size(4)
            .classify_with_progress(&transactions(10), Some(&progress), None);

        assert_eq!(outcome.summary.processed, 10);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_cancel_between_chunks() {
        let matcher = RuleMatcher::default();
        let rules = rules();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();
        // Cancel as soon as the first chunk reports
        let progress: BatchProgressCallback = Box::new(move |_, _| {
            flag.store(true, Ordering::SeqCst);
        });

        let outcome = BatchClassifier::new(&matcher, &rules)
            .with_chunk_size(3)
            .classify_with_progress(&transactions(10), Some(&progress), Some(&cancel));

        assert!(outcome.cancelled);
        assert_eq!(outcome.summary.processed, 3);
        assert_eq!(outcome.results.len(), 3);
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let matcher = RuleMatcher::default();
        let rules = rules();
        let outcome = BatchClassifier::new(&matcher, &rules)
            .with_chunk_size(0)
            .classify_all(&transactions(2));
        assert_eq!(outcome.summary.processed, 2);
    }

    #[test]
    fn test_empty_input() {
        let matcher = RuleMatcher::default();
        let outcome = BatchClassifier::new(&matcher, &[]).classify_all(&[]);
        assert_eq!(outcome.summary, BatchSummary::default());
        assert!(!outcome.cancelled);
    }
}
