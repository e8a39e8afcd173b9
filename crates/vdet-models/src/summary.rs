//! Detection summary models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;

use crate::detection::Detection;

/// Per-class detection counts for a video.
///
/// Supplied by the detection service, or computed locally from the
/// detection list when the service omits it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct DetectionSummary {
    /// Total number of detections
    #[serde(default)]
    pub total: u64,
    /// Detections per class name, in the order the service listed them
    #[serde(default)]
    pub by_class: IndexMap<String, u64>,
    /// Number of distinct class names
    #[serde(default)]
    pub unique_classes: u64,
}

impl DetectionSummary {
    /// Compute a summary by tallying every detection's class.
    pub fn from_detections(detections: &[Detection]) -> Self {
        let by_class = tally_by_class(detections);
        Self {
            total: detections.len() as u64,
            unique_classes: by_class.len() as u64,
            by_class,
        }
    }

    /// Whether the summary holds no detections at all.
    pub fn is_empty(&self) -> bool {
        self.total == 0 && self.by_class.is_empty()
    }

    /// The `n` most frequent classes.
    pub fn top_classes(&self, n: usize) -> Vec<ClassCount> {
        top_classes(&self.by_class, n)
    }
}

/// Count detections per class name, in order of first appearance.
pub fn tally_by_class(detections: &[Detection]) -> IndexMap<String, u64> {
    let mut by_class = IndexMap::new();
    for detection in detections {
        *by_class.entry(detection.class_name.clone()).or_insert(0) += 1;
    }
    by_class
}

/// A class name with its detection count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ClassCount {
    pub class_name: String,
    pub count: u64,
}

/// The `n` highest counts, largest first; ties keep their map order.
pub fn top_classes(by_class: &IndexMap<String, u64>, n: usize) -> Vec<ClassCount> {
    let mut entries: Vec<ClassCount> = by_class
        .iter()
        .map(|(class_name, &count)| ClassCount {
            class_name: class_name.clone(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BoundingBox;

    fn detection(class_name: &str) -> Detection {
        Detection::new(0, 0.0, class_name, 0.5, BoundingBox::new(0.0, 0.0, 1.0, 1.0))
    }

    #[test]
    fn test_from_detections() {
        let detections = vec![detection("car"), detection("person"), detection("car")];
        let summary = DetectionSummary::from_detections(&detections);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.unique_classes, 2);
        assert_eq!(summary.by_class["car"], 2);
        assert_eq!(summary.by_class["person"], 1);
        let order: Vec<&str> = summary.by_class.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["car", "person"]);
    }

    #[test]
    fn test_deserialize_keeps_service_order() {
        let json = r#"{"total": 6, "by_class": {"truck": 1, "person": 3, "bicycle": 2}}"#;
        let summary: DetectionSummary = serde_json::from_str(json).unwrap();
        let order: Vec<&str> = summary.by_class.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["truck", "person", "bicycle"]);
    }

    #[test]
    fn test_from_no_detections() {
        let summary = DetectionSummary::from_detections(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.unique_classes, 0);
    }

    #[test]
    fn test_top_classes_ties_keep_map_order() {
        let by_class: IndexMap<String, u64> = [("dog", 2), ("car", 5), ("bus", 2), ("cat", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let top = top_classes(&by_class, 3);
        let names: Vec<&str> = top.iter().map(|c| c.class_name.as_str()).collect();
        assert_eq!(names, vec!["car", "dog", "bus"]);
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        let json = r#"{"total": 4, "by_class": {"person": 4}, "unique_classes": 1, "has_audio": true}"#;
        let summary: DetectionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.by_class["person"], 4);
    }
}
