//! Frame-synchronized detection overlays and detection analytics.
//!
//! This crate provides:
//! - Class color assignment (fixed table plus hashed hues)
//! - Playback time to frame index conversion with frame observers
//! - Per-frame detection lookup and bounding box rendering
//! - Time-bucket and per-class aggregation
//! - Chart specs and chart instance lifecycle
//! - Playback and analytics views wiring it all together
//!
//! Everything here is single-threaded and synchronous. Hosts supply the
//! media element, drawing surface, chart backend and animation-frame
//! scheduler through the traits in [`media`], [`surface`], [`charts`] and
//! [`scheduler`].

pub mod aggregate;
pub mod analytics;
pub mod charts;
pub mod clock;
pub mod config;
pub mod error;
pub mod index;
pub mod logging;
pub mod media;
pub mod metrics;
pub mod overlay;
pub mod palette;
pub mod player;
pub mod scheduler;
pub mod surface;

pub use aggregate::{bucket_count, class_tally, time_histogram, TimeHistogram, MAX_BUCKETS};
pub use analytics::{dataset_fingerprint, AnalyticsView, DatasetChange, DetectionRow, SummaryCard};
pub use charts::{
    ChartBackend, ChartKind, ChartRegistry, ChartSpec, ChartState, RebuildOutcome,
    RecordingChartBackend,
};
pub use clock::{FrameClock, FrameObserver, FrameStep, FrameTick, ObserverId};
pub use config::OverlayConfig;
pub use error::{OverlayError, OverlayResult};
pub use index::DetectionIndex;
pub use logging::{Component, SessionLogger};
pub use media::{MediaElement, SimulatedMedia, SUPPORTED_SPEEDS};
pub use overlay::{OverlayPipeline, OverlayRenderer, RenderStats};
pub use palette::{chart_palette, color_for, known_class_color};
pub use player::{DetectionListItem, FrameInfo, PlaybackSession};
pub use scheduler::{CallbackHandle, CallbackRegistry, FrameScheduler, ManualScheduler};
pub use surface::{CanvasSize, DrawCommand, DrawingSurface, Font, Rect, RecordingSurface};
