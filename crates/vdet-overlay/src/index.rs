//! Frame → detections lookup.

use std::collections::HashMap;

use vdet_models::Detection;

/// Detections indexed by their `frame` field.
///
/// Lookups return every detection whose frame equals the query, in the
/// order the pipeline produced them. Nothing is sorted, deduplicated or
/// filtered by confidence.
#[derive(Debug, Clone, Default)]
pub struct DetectionIndex {
    detections: Vec<Detection>,
    by_frame: HashMap<u64, Vec<usize>>,
}

impl DetectionIndex {
    /// Build the index; positions per frame are kept ascending.
    pub fn new(detections: Vec<Detection>) -> Self {
        let mut by_frame: HashMap<u64, Vec<usize>> = HashMap::new();
        for (position, detection) in detections.iter().enumerate() {
            by_frame.entry(detection.frame).or_default().push(position);
        }
        Self {
            detections,
            by_frame,
        }
    }

    /// Every detection for `frame`, in original order.
    pub fn detections_for_frame(&self, frame: u64) -> Vec<&Detection> {
        self.by_frame
            .get(&frame)
            .map(|positions| positions.iter().map(|&i| &self.detections[i]).collect())
            .unwrap_or_default()
    }

    /// Number of detections for `frame`.
    pub fn count_for_frame(&self, frame: u64) -> usize {
        self.by_frame.get(&frame).map_or(0, Vec::len)
    }

    /// Distinct frames that have detections, ascending.
    pub fn frames(&self) -> Vec<u64> {
        let mut frames: Vec<u64> = self.by_frame.keys().copied().collect();
        frames.sort_unstable();
        frames
    }

    /// All detections in original order.
    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

/// Linear-scan lookup with the same contract as
/// [`DetectionIndex::detections_for_frame`].
pub fn filter_by_frame(detections: &[Detection], frame: u64) -> Vec<&Detection> {
    detections.iter().filter(|d| d.frame == frame).collect()
}
