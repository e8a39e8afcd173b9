//! Video metadata and the video/detection aggregate.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::detection::Detection;
use crate::error::{ModelError, ModelResult};
use crate::summary::DetectionSummary;

/// Frame rate used when metadata omits it (or reports zero).
pub const DEFAULT_FPS: f64 = 25.0;

/// Duration in seconds used when metadata omits it.
pub const DEFAULT_DURATION_SECS: f64 = 60.0;

/// Unique identifier for an uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Video processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    /// Uploaded, waiting for the worker
    Uploaded,
    /// Detection pipeline is running
    #[default]
    Processing,
    /// Detections are available
    Completed,
    /// Processing failed
    Failed,
    /// Any status this client does not know about
    #[serde(other)]
    Unknown,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Uploaded => "uploaded",
            VideoStatus::Processing => "processing",
            VideoStatus::Completed => "completed",
            VideoStatus::Failed => "failed",
            VideoStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Technical metadata of a processed video.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct VideoMetadata {
    /// Native frame width in pixels
    pub width: u32,
    /// Native frame height in pixels
    pub height: u32,
    /// Frames per second, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    /// Duration in seconds, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Total frames in the source
    #[serde(default)]
    pub total_frames: u64,
    /// Frames the detection pipeline actually analyzed
    #[serde(default)]
    pub frames_processed: u64,
}

impl VideoMetadata {
    /// Frame rate, falling back to [`DEFAULT_FPS`] when missing, zero or invalid.
    pub fn effective_fps(&self) -> f64 {
        resolve_fps(self.fps)
    }

    /// Duration, falling back to [`DEFAULT_DURATION_SECS`] when missing or non-positive.
    pub fn effective_duration(&self) -> f64 {
        match self.duration {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => DEFAULT_DURATION_SECS,
        }
    }

    /// Check the invariants the pipeline is expected to uphold.
    pub fn validate(&self) -> ModelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ModelError::invalid_metadata(format!(
                "resolution {}x{} must be positive",
                self.width, self.height
            )));
        }
        if self.frames_processed > self.total_frames {
            return Err(ModelError::invalid_metadata(format!(
                "frames_processed {} exceeds total_frames {}",
                self.frames_processed, self.total_frames
            )));
        }
        Ok(())
    }
}

/// Resolve an optional frame rate to a usable positive value.
pub fn resolve_fps(fps: Option<f64>) -> f64 {
    match fps {
        Some(f) if f.is_finite() && f > 0.0 => f,
        _ => DEFAULT_FPS,
    }
}

/// A video together with its detections, as served by the video API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoAggregate {
    /// Unique video ID
    pub video_id: VideoId,

    /// Processing status
    #[serde(default)]
    pub status: VideoStatus,

    /// Technical metadata (absent while processing)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VideoMetadata>,

    /// Detections in pipeline output order (not time-sorted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detections: Option<Vec<Detection>>,

    /// Pre-aggregated summary, when the service provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<DetectionSummary>,

    /// Total detection count reported on the video record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_detections: Option<u64>,

    /// Error message (if failed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl VideoAggregate {
    /// Create an aggregate with metadata and detections and no summary.
    pub fn new(
        video_id: impl Into<VideoId>,
        metadata: VideoMetadata,
        detections: Vec<Detection>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            status: VideoStatus::Completed,
            metadata: Some(metadata),
            detections: Some(detections),
            summary: None,
            total_detections: None,
            error_message: None,
        }
    }

    /// Decode an aggregate from the API's JSON payload.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Attach a pre-aggregated summary.
    pub fn with_summary(mut self, summary: DetectionSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    /// Detections in original order; empty when none were supplied.
    pub fn detections(&self) -> &[Detection] {
        self.detections.as_deref().unwrap_or(&[])
    }

    /// Metadata, or an all-default record when absent.
    pub fn metadata_or_default(&self) -> Cow<'_, VideoMetadata> {
        match &self.metadata {
            Some(metadata) => Cow::Borrowed(metadata),
            None => Cow::Owned(VideoMetadata::default()),
        }
    }

    /// Frame rate with the default substituted.
    pub fn fps(&self) -> f64 {
        resolve_fps(self.metadata.as_ref().and_then(|m| m.fps))
    }

    /// Duration with the default substituted.
    pub fn duration(&self) -> f64 {
        self.metadata_or_default().effective_duration()
    }

    /// The supplied summary, or one tallied from the detections.
    ///
    /// Returns `None` only when neither a summary nor a detection list exists.
    pub fn resolved_summary(&self) -> Option<Cow<'_, DetectionSummary>> {
        match (&self.summary, &self.detections) {
            (Some(summary), _) => Some(Cow::Borrowed(summary)),
            (None, Some(detections)) => {
                Some(Cow::Owned(DetectionSummary::from_detections(detections)))
            }
            (None, None) => None,
        }
    }

    /// Whether there is anything to show (a summary or at least one detection).
    pub fn has_detection_data(&self) -> bool {
        self.summary.is_some() || !self.detections().is_empty()
    }

    /// Advisory validation: every malformed detection with its position.
    pub fn validation_issues(&self) -> Vec<(usize, String)> {
        self.detections()
            .iter()
            .enumerate()
            .filter_map(|(index, detection)| detection.validation_issue().map(|r| (index, r)))
            .collect()
    }

    /// Strict validation: the metadata and the first malformed detection as an error.
    pub fn validate_strict(&self) -> ModelResult<()> {
        if let Some(metadata) = &self.metadata {
            metadata.validate()?;
        }
        match self.validation_issues().into_iter().next() {
            Some((index, reason)) => Err(ModelError::invalid_detection(index, reason)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BoundingBox;

    fn detection(frame: u64, class_name: &str) -> Detection {
        Detection::new(frame, frame as f64 / 25.0, class_name, 0.9, BoundingBox::new(0.0, 0.0, 5.0, 5.0))
    }

    #[test]
    fn test_fps_defaults() {
        let mut metadata = VideoMetadata {
            width: 1280,
            height: 720,
            ..Default::default()
        };
        assert_eq!(metadata.effective_fps(), DEFAULT_FPS);
        metadata.fps = Some(0.0);
        assert_eq!(metadata.effective_fps(), DEFAULT_FPS);
        metadata.fps = Some(29.97);
        assert_eq!(metadata.effective_fps(), 29.97);
    }

    #[test]
    fn test_duration_defaults() {
        let metadata = VideoMetadata::default();
        assert_eq!(metadata.effective_duration(), DEFAULT_DURATION_SECS);

        let aggregate = VideoAggregate {
            metadata: None,
            ..VideoAggregate::new("v1", metadata, vec![])
        };
        assert_eq!(aggregate.duration(), DEFAULT_DURATION_SECS);
        assert_eq!(aggregate.fps(), DEFAULT_FPS);
    }

    #[test]
    fn test_resolved_summary_prefers_supplied() {
        let supplied = DetectionSummary {
            total: 99,
            ..Default::default()
        };
        let aggregate = VideoAggregate::new("v1", VideoMetadata::default(), vec![detection(0, "car")])
            .with_summary(supplied.clone());
        assert_eq!(aggregate.resolved_summary().unwrap().as_ref(), &supplied);
    }

    #[test]
    fn test_resolved_summary_falls_back_to_tally() {
        let aggregate = VideoAggregate::new(
            "v1",
            VideoMetadata::default(),
            vec![detection(0, "car"), detection(1, "car")],
        );
        let summary = aggregate.resolved_summary().unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.by_class["car"], 2);

        let empty = VideoAggregate {
            detections: None,
            ..aggregate
        };
        assert!(empty.resolved_summary().is_none());
    }

    #[test]
    fn test_from_json_api_payload() {
        let json = r#"{
            "video_id": "abc-123",
            "user_id": "u1",
            "status": "completed",
            "metadata": {"width": 1920, "height": 1080, "fps": 30.0, "duration": 12.5,
                         "total_frames": 375, "frames_processed": 375},
            "detections": [
                {"frame": 0, "timestamp": 0.0, "class_id": 0, "class_name": "person",
                 "confidence": 0.9, "bbox": {"x1": 1, "y1": 2, "x2": 3, "y2": 4}}
            ]
        }"#;
        let aggregate = VideoAggregate::from_json(json).unwrap();
        assert_eq!(aggregate.video_id.as_str(), "abc-123");
        assert_eq!(aggregate.status, VideoStatus::Completed);
        assert_eq!(aggregate.fps(), 30.0);
        assert_eq!(aggregate.detections().len(), 1);
        assert!(aggregate.summary.is_none());
    }

    #[test]
    fn test_unknown_status() {
        let aggregate = VideoAggregate::from_json(r#"{"video_id": "x", "status": "queued"}"#).unwrap();
        assert_eq!(aggregate.status, VideoStatus::Unknown);
        assert!(aggregate.detections().is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            VideoAggregate::from_json("{not json"),
            Err(ModelError::JsonParse(_))
        ));
    }

    #[test]
    fn test_validate_strict() {
        let mut bad = detection(3, "car");
        bad.confidence = -0.2;
        let aggregate = VideoAggregate::new(
            "v1",
            VideoMetadata {
                width: 640,
                height: 480,
                total_frames: 10,
                frames_processed: 10,
                ..Default::default()
            },
            vec![detection(0, "car"), bad],
        );
        assert_eq!(aggregate.validation_issues().len(), 1);
        assert!(matches!(
            aggregate.validate_strict(),
            Err(ModelError::InvalidDetection { index: 1, .. })
        ));
    }

    #[test]
    fn test_metadata_validate() {
        let metadata = VideoMetadata {
            width: 640,
            height: 480,
            total_frames: 10,
            frames_processed: 11,
            ..Default::default()
        };
        assert!(matches!(metadata.validate(), Err(ModelError::InvalidMetadata(_))));
    }
}
