//! Recurrence detection
//!
//! Infers a spending cadence from the average gap between occurrence dates.
//! The detector is deliberately simple: one average, no outlier rejection.
//! Irregular gaps that happen to average into a band classify as that band.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{Profile, ProfileThresholds};
use crate::models::RecurrenceInterval;

/// Inclusive band of average gap days
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub interval: RecurrenceInterval,
    pub min_days: f64,
    pub max_days: f64,
}

impl Band {
    const fn new(interval: RecurrenceInterval, min_days: f64, max_days: f64) -> Self {
        Self {
            interval,
            min_days,
            max_days,
        }
    }

    fn contains(&self, days: f64) -> bool {
        days >= self.min_days && days <= self.max_days
    }
}

pub const WEEKLY_BAND: Band = Band::new(RecurrenceInterval::Weekly, 6.0, 8.0);
pub const MONTHLY_BAND: Band = Band::new(RecurrenceInterval::Monthly, 25.0, 35.0);
pub const QUARTERLY_BAND: Band = Band::new(RecurrenceInterval::Quarterly, 80.0, 100.0);
pub const BI_ANNUAL_BAND: Band = Band::new(RecurrenceInterval::BiAnnually, 170.0, 195.0);
pub const ANNUAL_BAND: Band = Band::new(RecurrenceInterval::Annually, 350.0, 380.0);

const STRICT_BANDS: &[Band] = &[MONTHLY_BAND, QUARTERLY_BAND, BI_ANNUAL_BAND, ANNUAL_BAND];
const LENIENT_BANDS: &[Band] = &[
    WEEKLY_BAND,
    MONTHLY_BAND,
    QUARTERLY_BAND,
    BI_ANNUAL_BAND,
    ANNUAL_BAND,
];

/// Band set selected by a profile's thresholds
pub fn bands_for(thresholds: &ProfileThresholds) -> &'static [Band] {
    if thresholds.weekly_band {
        LENIENT_BANDS
    } else {
        STRICT_BANDS
    }
}

/// Result of running detection over a date sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceEstimate {
    pub interval: RecurrenceInterval,
    pub confidence: f64,
    /// `None` with fewer than two dates
    pub average_gap_days: Option<f64>,
    pub occurrences: usize,
}

impl RecurrenceEstimate {
    fn none(occurrences: usize) -> Self {
        Self {
            interval: RecurrenceInterval::NotApplicable,
            confidence: 0.0,
            average_gap_days: None,
            occurrences,
        }
    }
}

/// Classify an average gap against a band set
pub fn classify_gap(average_gap_days: f64, bands: &[Band]) -> RecurrenceInterval {
    bands
        .iter()
        .find(|band| band.contains(average_gap_days))
        .map(|band| band.interval)
        .unwrap_or(RecurrenceInterval::NotApplicable)
}

/// Detect the recurrence interval of a set of dates (order does not matter)
///
/// Uses the built-in bands for `profile`; callers holding an `EngineConfig`
/// pass `bands_for(config.profile(..))` to [`detect_with_bands`] instead.
pub fn detect(dates: &[NaiveDate], profile: Profile) -> RecurrenceEstimate {
    detect_with_bands(dates, bands_for(&ProfileThresholds::for_profile(profile)))
}

/// Detect against an explicit band set
pub fn detect_with_bands(dates: &[NaiveDate], bands: &[Band]) -> RecurrenceEstimate {
    if dates.len() < 2 {
        return RecurrenceEstimate::none(dates.len());
    }

    let mut sorted = dates.to_vec();
    sorted.sort();

    let gaps: Vec<i64> = sorted
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .collect();

    let average = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;
    let interval = classify_gap(average, bands);

    RecurrenceEstimate {
        interval,
        confidence: interval.detection_confidence(),
        average_gap_days: Some(average),
        occurrences: dates.len(),
    }
}

/// Detect from raw date strings, skipping any that fail to parse
pub fn detect_from_strings<S: AsRef<str>>(dates: &[S], profile: Profile) -> RecurrenceEstimate {
    let parsed: Vec<NaiveDate> = dates
        .iter()
        .filter_map(|d| crate::models::parse_date(d.as_ref()))
        .collect();
    detect(&parsed, profile)
}
