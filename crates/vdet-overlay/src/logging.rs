//! Structured session events.
//!
//! Every event carries the video ID and the [`Component`] that emitted it,
//! plus typed fields for the event itself, so log pipelines can filter on
//! `detections` or `charts` without parsing messages.

use std::fmt;

use tracing::{info, warn, Span};
use vdet_models::VideoId;

/// Which view a session event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Playback,
    Analytics,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Playback => "playback",
            Component::Analytics => "analytics",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emits the lifecycle events of one playback or analytics session.
#[derive(Debug, Clone)]
pub struct SessionLogger {
    video_id: VideoId,
    component: Component,
}

impl SessionLogger {
    pub fn new(video_id: &VideoId, component: Component) -> Self {
        Self {
            video_id: video_id.clone(),
            component,
        }
    }

    /// A detection set was attached (on start or on replacement).
    pub fn log_dataset_loaded(&self, detections: usize, fps: f64) {
        info!(
            video_id = %self.video_id,
            component = %self.component,
            detections,
            fps,
            "Dataset loaded"
        );
    }

    /// A record failed advisory validation; it is still drawn.
    pub fn log_malformed_detection(&self, index: usize, reason: &str) {
        warn!(
            video_id = %self.video_id,
            component = %self.component,
            index,
            reason,
            "Malformed detection"
        );
    }

    pub fn log_charts_rebuilt(&self, charts: usize, detections: usize, excluded: u64) {
        info!(
            video_id = %self.video_id,
            component = %self.component,
            charts,
            detections,
            excluded,
            "Charts rebuilt"
        );
    }

    /// Playback teardown: observers dropped and repaints cancelled.
    pub fn log_playback_teardown(&self, observers: usize, redraws: usize) {
        info!(
            video_id = %self.video_id,
            component = %self.component,
            observers,
            redraws,
            "Playback torn down"
        );
    }

    pub fn log_charts_disposed(&self, charts: usize) {
        info!(
            video_id = %self.video_id,
            component = %self.component,
            charts,
            "Charts disposed"
        );
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    pub fn component(&self) -> Component {
        self.component
    }

    /// Span wrapping work done on behalf of this session.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "session",
            video_id = %self.video_id,
            component = %self.component
        )
    }
}
