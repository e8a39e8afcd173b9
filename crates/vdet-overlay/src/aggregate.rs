//! Time-bucket and per-class aggregation of detections.
//!
//! Both functions are pure and recomputed from scratch whenever the
//! detection set or the video duration changes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use vdet_models::timestamp::format_number;
use vdet_models::{tally_by_class, Detection, DetectionSummary};

/// Default timeline bucket width in seconds.
pub const DEFAULT_BUCKET_INTERVAL_SECS: f64 = 5.0;

/// Upper bound on timeline buckets, whatever duration the metadata claims.
pub const MAX_BUCKETS: usize = 10_000;

/// Detection counts per fixed-width time bucket.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeHistogram {
    /// Bucket labels, e.g. `["0s", "5s", "10s"]`
    pub labels: Vec<String>,
    /// Counts aligned with `labels`
    pub counts: Vec<u64>,
    /// Detections whose timestamp fell outside every bucket
    pub excluded: u64,
}

impl TimeHistogram {
    pub fn bucket_count(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all bucket counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Label/count pairs in bucket order.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, u64)> {
        self.labels.iter().map(String::as_str).zip(self.counts.iter().copied())
    }
}

/// Number of buckets covering `duration`: `ceil(duration / interval)`,
/// capped at [`MAX_BUCKETS`].
///
/// Non-positive or non-finite inputs give zero buckets.
pub fn bucket_count(duration: f64, interval: f64) -> usize {
    if !(duration.is_finite() && interval.is_finite()) || duration <= 0.0 || interval <= 0.0 {
        return 0;
    }
    let buckets = (duration / interval).ceil();
    if buckets >= MAX_BUCKETS as f64 {
        MAX_BUCKETS
    } else {
        buckets as usize
    }
}

/// Bucket a detection falls in, `floor(timestamp / interval)`, if any.
fn bucket_index(timestamp: f64, interval: f64, buckets: usize) -> Option<usize> {
    let index = (timestamp / interval).floor();
    if index.is_finite() && index >= 0.0 && (index as usize) < buckets {
        Some(index as usize)
    } else {
        None
    }
}

/// Count detections per `interval`-second bucket over `[0, duration)`.
///
/// Detections past the last bucket (timestamps beyond the declared
/// duration, or beyond [`MAX_BUCKETS`] intervals) are dropped and counted
/// in [`TimeHistogram::excluded`], so
/// `total() + excluded == detections.len()`.
pub fn time_histogram(detections: &[Detection], duration: f64, interval: f64) -> TimeHistogram {
    let buckets = bucket_count(duration, interval);
    let labels = (0..buckets)
        .map(|i| format!("{}s", format_number(i as f64 * interval)))
        .collect();
    let mut counts = vec![0u64; buckets];
    let mut excluded = 0u64;

    for detection in detections {
        match bucket_index(detection.timestamp, interval, buckets) {
            Some(index) => counts[index] += 1,
            None => excluded += 1,
        }
    }

    crate::metrics::record_histogram_excluded(excluded);
    TimeHistogram {
        labels,
        counts,
        excluded,
    }
}

/// Detections per class name, in order of first appearance.
pub fn class_tally(detections: &[Detection]) -> IndexMap<String, u64> {
    tally_by_class(detections)
}

/// Whether a supplied summary agrees with a local tally of `detections`.
pub fn summary_matches(summary: &DetectionSummary, detections: &[Detection]) -> bool {
    summary.by_class == class_tally(detections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vdet_models::BoundingBox;

    fn at(timestamp: f64, class_name: &str) -> Detection {
        Detection::new(
            (timestamp * 25.0).floor() as u64,
            timestamp,
            class_name,
            0.8,
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
        )
    }

    #[test]
    fn test_bucket_labels_for_12_seconds() {
        let histogram = time_histogram(&[], 12.0, 5.0);
        assert_eq!(histogram.bucket_count(), 3);
        assert_eq!(histogram.labels, vec!["0s", "5s", "10s"]);
        assert_eq!(histogram.counts, vec![0, 0, 0]);
    }

    #[test]
    fn test_detection_lands_in_last_partial_bucket() {
        let histogram = time_histogram(&[at(11.9, "car")], 12.0, 5.0);
        assert_eq!(histogram.counts, vec![0, 0, 1]);
        assert_eq!(histogram.excluded, 0);
    }

    #[test]
    fn test_detection_beyond_duration_is_excluded() {
        let detections = vec![at(1.0, "car"), at(100.0, "car"), at(59.9, "person")];
        let histogram = time_histogram(&detections, 60.0, 5.0);
        assert_eq!(histogram.bucket_count(), 12);
        assert_eq!(histogram.total(), 2);
        assert_eq!(histogram.excluded, 1);
        assert_eq!(histogram.counts[0], 1);
        assert_eq!(histogram.counts[11], 1);
    }

    #[test]
    fn test_counts_plus_excluded_equals_total() {
        let detections: Vec<Detection> = (0..200).map(|i| at(i as f64 * 0.37, "car")).collect();
        for duration in [0.0, 4.0, 12.0, 33.3, 60.0, 90.0] {
            let histogram = time_histogram(&detections, duration, 5.0);
            assert_eq!(
                histogram.total() + histogram.excluded,
                detections.len() as u64,
                "duration {}",
                duration
            );
        }
    }

    #[test]
    fn test_boundary_timestamp_starts_next_bucket() {
        let histogram = time_histogram(&[at(5.0, "car"), at(10.0, "car")], 10.0, 5.0);
        assert_eq!(histogram.counts, vec![0, 1]);
        assert_eq!(histogram.excluded, 1);
    }

    #[test]
    fn test_negative_timestamp_is_excluded() {
        let mut detection = at(0.0, "car");
        detection.timestamp = -0.5;
        let histogram = time_histogram(&[detection], 10.0, 5.0);
        assert_eq!(histogram.total(), 0);
        assert_eq!(histogram.excluded, 1);
    }

    #[test]
    fn test_fractional_interval_labels() {
        let histogram = time_histogram(&[], 5.0, 2.5);
        assert_eq!(histogram.labels, vec!["0s", "2.5s"]);
    }

    #[test]
    fn test_zero_duration_has_no_buckets() {
        let histogram = time_histogram(&[at(1.0, "car")], 0.0, 5.0);
        assert_eq!(histogram.bucket_count(), 0);
        assert_eq!(histogram.excluded, 1);
    }

    #[test]
    fn test_huge_duration_is_capped() {
        assert_eq!(bucket_count(1e13, 5.0), MAX_BUCKETS);
        assert_eq!(bucket_count(f64::MAX, 1e-300), MAX_BUCKETS);

        let detections = vec![at(1.0, "car"), at(1e12, "car")];
        let histogram = time_histogram(&detections, 1e13, 5.0);
        assert_eq!(histogram.bucket_count(), MAX_BUCKETS);
        assert_eq!(histogram.labels[MAX_BUCKETS - 1], "49995s");
        assert_eq!(histogram.counts[0], 1);
        assert_eq!(histogram.excluded, 1);
        assert_eq!(histogram.total() + histogram.excluded, detections.len() as u64);
    }

    #[test]
    fn test_class_tally() {
        let detections = vec![at(0.0, "car"), at(1.0, "person"), at(2.0, "car")];
        let tally = class_tally(&detections);
        assert_eq!(tally.len(), 2);
        assert_eq!(tally["car"], 2);
        assert_eq!(tally["person"], 1);
    }

    #[test]
    fn test_tally_matches_supplied_summary() {
        let detections = vec![at(0.0, "car"), at(1.0, "person"), at(2.0, "car")];
        let supplied: DetectionSummary = serde_json::from_str(
            r#"{"total": 3, "by_class": {"person": 1, "car": 2}, "unique_classes": 2}"#,
        )
        .unwrap();
        assert!(summary_matches(&supplied, &detections));
        assert_eq!(DetectionSummary::from_detections(&detections), supplied);
    }
}
