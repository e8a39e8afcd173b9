//! Detection records produced by the object-detection pipeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in native video pixel coordinates.
///
/// `(x1, y1)` is the top-left corner and `(x2, y2)` the bottom-right one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its corners.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box width in pixels.
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    /// Box height in pixels.
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Check that the corners are finite and ordered.
    pub fn is_valid(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite())
            && self.x2 >= self.x1
            && self.y2 >= self.y1
    }
}

/// One object-recognition result tied to a video frame.
///
/// `frame` and `timestamp` are supplied independently by the detection
/// pipeline. `frame ≈ floor(timestamp * fps)` usually holds but both are
/// used exactly as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Detection {
    /// Frame index (0-based)
    pub frame: u64,
    /// Presentation time in seconds
    pub timestamp: f64,
    /// Model class id, when the pipeline reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<u32>,
    /// Class label, e.g. "person"
    pub class_name: String,
    /// Detection confidence [0, 1]
    pub confidence: f64,
    /// Bounding box in native pixel space
    pub bbox: BoundingBox,
}

impl Detection {
    /// Create a detection without a class id.
    pub fn new(
        frame: u64,
        timestamp: f64,
        class_name: impl Into<String>,
        confidence: f64,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            frame,
            timestamp,
            class_id: None,
            class_name: class_name.into(),
            confidence,
            bbox,
        }
    }

    /// Confidence as a percentage with one decimal, e.g. `"95.3%"`.
    pub fn confidence_label(&self) -> String {
        crate::timestamp::format_percent(self.confidence)
    }

    /// Overlay label, e.g. `"person 95.3%"`.
    pub fn label(&self) -> String {
        format!("{} {}", self.class_name, self.confidence_label())
    }

    /// Describe why this record is malformed, if it is.
    ///
    /// Records are never rejected by playback; this is for diagnostics.
    pub fn validation_issue(&self) -> Option<String> {
        if self.class_name.trim().is_empty() {
            return Some("class_name is empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Some(format!("confidence {} outside [0, 1]", self.confidence));
        }
        if !self.timestamp.is_finite() || self.timestamp < 0.0 {
            return Some(format!("timestamp {} is negative or not finite", self.timestamp));
        }
        if !self.bbox.is_valid() {
            return Some(format!(
                "bbox ({}, {}, {}, {}) has inverted or non-finite corners",
                self.bbox.x1, self.bbox.y1, self.bbox.x2, self.bbox.y2
            ));
        }
        None
    }
}
