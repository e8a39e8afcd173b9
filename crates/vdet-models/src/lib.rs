//! Shared data models for video detection playback and analytics.
//!
//! This crate provides Serde-serializable types for:
//! - Video metadata and the video/detection aggregate served by the API
//! - Detection records and their bounding boxes
//! - Detection summaries (per-class tallies)
//! - Display colors
//! - Timestamp and percentage formatting used by the presentation layer

pub mod color;
pub mod detection;
pub mod error;
pub mod summary;
pub mod timestamp;
pub mod video;

// Re-export common types
pub use color::Color;
pub use detection::{BoundingBox, Detection};
pub use error::{ModelError, ModelResult};
pub use summary::{tally_by_class, top_classes, ClassCount, DetectionSummary};
pub use video::{
    resolve_fps, VideoAggregate, VideoId, VideoMetadata, VideoStatus, DEFAULT_DURATION_SECS, DEFAULT_FPS,
};
