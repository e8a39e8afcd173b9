//! Analytics view: summary card, detection table and the three charts.
//!
//! Charts are rebuilt when the dataset changes, never per frame. A dataset
//! is identified by a fingerprint over the video ID, metadata, summary and
//! detections, so handing the view the same aggregate twice is free.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use vdet_models::timestamp::{format_clock, format_percent, to_fixed};
use vdet_models::{ClassCount, Detection, DetectionSummary, VideoAggregate, VideoId};

use crate::aggregate::{time_histogram, TimeHistogram};
use crate::charts::{
    bar_chart_spec, pie_chart_spec, timeline_chart_spec, ChartBackend, ChartKind, ChartRegistry,
    ClassSeries,
};
use crate::config::OverlayConfig;
use crate::error::{OverlayError, OverlayResult};
use crate::logging::{Component, SessionLogger};
use crate::scheduler::{CallbackHandle, FrameScheduler};

/// What [`AnalyticsView::on_dataset_changed`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetChange {
    /// Same dataset as before; nothing recomputed
    Unchanged,
    /// Aggregates recomputed and charts rebuilt
    Rebuilt { charts: usize },
}

/// Headline numbers of the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SummaryCard {
    pub total_detections: u64,
    pub unique_classes: u64,
    pub frames_analyzed: u64,
    pub top_objects: Vec<ClassCount>,
}

/// One row of the "All Detections" table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRow {
    pub frame: u64,
    /// `m:ss`
    pub time: String,
    pub class_name: String,
    /// e.g. `"95.3%"`
    pub confidence: String,
    /// Top-left corner, e.g. `"(100, 50)"`
    pub position: String,
}

impl From<&Detection> for DetectionRow {
    fn from(detection: &Detection) -> Self {
        Self {
            frame: detection.frame,
            time: format_clock(detection.timestamp),
            class_name: detection.class_name.clone(),
            confidence: format_percent(detection.confidence),
            position: format!(
                "({}, {})",
                to_fixed(detection.bbox.x1, 0),
                to_fixed(detection.bbox.y1, 0)
            ),
        }
    }
}

/// Identity of a dataset for change detection.
pub fn dataset_fingerprint(aggregate: &VideoAggregate) -> u64 {
    let mut hasher = DefaultHasher::new();
    aggregate.video_id.hash(&mut hasher);

    let metadata = aggregate.metadata_or_default();
    metadata.fps.map(f64::to_bits).hash(&mut hasher);
    metadata.duration.map(f64::to_bits).hash(&mut hasher);
    metadata.frames_processed.hash(&mut hasher);

    hash_summary(aggregate.summary.as_ref(), &mut hasher);
    aggregate.total_detections.hash(&mut hasher);
    match &aggregate.detections {
        Some(detections) => {
            detections.len().hash(&mut hasher);
            for detection in detections {
                hash_detection(detection, &mut hasher);
            }
        }
        None => u64::MAX.hash(&mut hasher),
    }
    hasher.finish()
}

fn hash_detection(detection: &Detection, hasher: &mut DefaultHasher) {
    detection.frame.hash(hasher);
    detection.timestamp.to_bits().hash(hasher);
    detection.class_name.hash(hasher);
    detection.confidence.to_bits().hash(hasher);
    let bbox = &detection.bbox;
    for edge in [bbox.x1, bbox.y1, bbox.x2, bbox.y2] {
        edge.to_bits().hash(hasher);
    }
}

fn hash_summary(summary: Option<&DetectionSummary>, hasher: &mut DefaultHasher) {
    match summary {
        Some(summary) => {
            summary.total.hash(hasher);
            summary.by_class.len().hash(hasher);
            for (class_name, count) in &summary.by_class {
                class_name.hash(hasher);
                count.hash(hasher);
            }
            summary.unique_classes.hash(hasher);
        }
        None => u64::MAX.hash(hasher),
    }
}

/// The analytics side of a video's detail page.
pub struct AnalyticsView<B: ChartBackend> {
    config: OverlayConfig,
    charts: ChartRegistry<B>,
    fingerprint: Option<u64>,
    video_id: Option<VideoId>,
    logger: Option<SessionLogger>,
    summary: Option<DetectionSummary>,
    histogram: TimeHistogram,
    rows: Vec<DetectionRow>,
    total_detections: Option<u64>,
    frames_processed: u64,
    has_data: bool,
    closed: bool,
}

impl<B: ChartBackend> AnalyticsView<B> {
    pub fn new(backend: B, config: OverlayConfig) -> Self {
        Self {
            config,
            charts: ChartRegistry::new(backend),
            fingerprint: None,
            video_id: None,
            logger: None,
            summary: None,
            histogram: TimeHistogram::default(),
            rows: Vec::new(),
            total_detections: None,
            frames_processed: 0,
            has_data: false,
            closed: false,
        }
    }

    /// Decode the video API payload and apply it as the current dataset.
    pub fn on_payload(&mut self, json: &str) -> OverlayResult<DatasetChange> {
        if self.closed {
            return Err(OverlayError::SessionClosed);
        }
        let aggregate = VideoAggregate::from_json(json)?;
        self.on_dataset_changed(&aggregate)
    }

    /// Recompute aggregates and rebuild charts if `aggregate` is a new dataset.
    pub fn on_dataset_changed(&mut self, aggregate: &VideoAggregate) -> OverlayResult<DatasetChange> {
        if self.closed {
            return Err(OverlayError::SessionClosed);
        }
        let fingerprint = dataset_fingerprint(aggregate);
        if self.fingerprint == Some(fingerprint) {
            return Ok(DatasetChange::Unchanged);
        }

        if self.video_id.as_ref() != Some(&aggregate.video_id) {
            self.logger = Some(SessionLogger::new(&aggregate.video_id, Component::Analytics));
            self.video_id = Some(aggregate.video_id.clone());
        }

        let summary = aggregate.resolved_summary().map(|s| s.into_owned());
        if aggregate.summary.is_none() && summary.is_some() {
            crate::metrics::record_summary_fallback();
        }

        let metadata = aggregate.metadata_or_default();
        let duration = self.config.duration_or_default(metadata.duration);
        let detections = aggregate.detections();
        self.histogram = time_histogram(detections, duration, self.config.bucket_interval_secs);
        self.rows = detections.iter().map(DetectionRow::from).collect();
        self.total_detections = aggregate.total_detections;
        self.frames_processed = metadata.frames_processed;
        self.has_data = aggregate.has_detection_data();
        self.summary = summary;
        self.fingerprint = Some(fingerprint);

        let charts = self.rebuild_charts(!detections.is_empty());
        if let Some(logger) = &self.logger {
            logger.log_charts_rebuilt(charts, detections.len(), self.histogram.excluded);
        }
        Ok(DatasetChange::Rebuilt { charts })
    }

    fn rebuild_charts(&mut self, has_detections: bool) -> usize {
        let mut built = 0;

        match self.summary.as_ref().filter(|s| !s.by_class.is_empty()) {
            Some(summary) => {
                let series = ClassSeries::from_summary(summary);
                for spec in [bar_chart_spec(&series), pie_chart_spec(&series)] {
                    if self.charts.rebuild(&spec).is_built() {
                        built += 1;
                    }
                }
            }
            None => {
                self.charts.clear(ChartKind::Bar);
                self.charts.clear(ChartKind::Pie);
            }
        }

        if has_detections {
            if self.charts.rebuild(&timeline_chart_spec(&self.histogram)).is_built() {
                built += 1;
            }
        } else {
            self.charts.clear(ChartKind::Timeline);
        }
        built
    }

    /// Totals and the most frequent classes.
    ///
    /// The total prefers a non-zero summary total, then the count on the
    /// video record.
    pub fn summary_card(&self) -> SummaryCard {
        let summary_total = self.summary.as_ref().map(|s| s.total).filter(|&t| t > 0);
        SummaryCard {
            total_detections: summary_total.or(self.total_detections).unwrap_or(0),
            unique_classes: self.summary.as_ref().map_or(0, |s| s.unique_classes),
            frames_analyzed: self.frames_processed,
            top_objects: self
                .summary
                .as_ref()
                .map(|s| s.top_classes(self.config.top_objects))
                .unwrap_or_default(),
        }
    }

    /// Rows of the detection table, in original order.
    pub fn detection_rows(&self) -> &[DetectionRow] {
        &self.rows
    }

    /// Whether there is a summary or at least one detection to show.
    pub fn has_data(&self) -> bool {
        self.has_data
    }

    pub fn summary(&self) -> Option<&DetectionSummary> {
        self.summary.as_ref()
    }

    pub fn histogram(&self) -> &TimeHistogram {
        &self.histogram
    }

    pub fn charts(&self) -> &ChartRegistry<B> {
        &self.charts
    }

    /// Schedule a repaint of one chart (e.g. after a container resize).
    pub fn request_chart_redraw(
        &mut self,
        kind: ChartKind,
        scheduler: &mut dyn FrameScheduler,
    ) -> Option<CallbackHandle> {
        if self.closed {
            return None;
        }
        self.charts.request_redraw(kind, scheduler)
    }

    pub fn run_chart_redraw(&mut self, handle: CallbackHandle) -> bool {
        self.charts.run_redraw(handle)
    }

    /// Dispose every chart and cancel pending repaints.
    pub fn teardown(&mut self, scheduler: &mut dyn FrameScheduler) -> usize {
        if self.closed {
            return 0;
        }
        self.closed = true;
        let disposed = self.charts.teardown(scheduler);
        if let Some(logger) = &self.logger {
            logger.log_charts_disposed(disposed);
        }
        disposed
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<B: ChartBackend> std::fmt::Debug for AnalyticsView<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsView")
            .field("video_id", &self.video_id)
            .field("charts", &self.charts)
            .field("rows", &self.rows.len())
            .field("closed", &self.closed)
            .finish()
    }
}
