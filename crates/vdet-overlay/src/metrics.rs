//! Metrics for overlay rendering and chart lifecycle.
//!
//! Recorded through the `metrics` facade; the host installs an exporter.

use metrics::{counter, gauge, histogram};

use crate::charts::ChartKind;

/// Metric names as constants for consistency.
pub mod names {
    // Overlay metrics
    pub const OVERLAY_RENDERS_TOTAL: &str = "vdet_overlay_renders_total";
    pub const OVERLAY_RENDER_NOOPS_TOTAL: &str = "vdet_overlay_render_noops_total";
    pub const OVERLAY_BOXES_DRAWN_TOTAL: &str = "vdet_overlay_boxes_drawn_total";
    pub const FRAME_DETECTIONS: &str = "vdet_frame_detections";

    // Aggregation metrics
    pub const HISTOGRAM_EXCLUDED_TOTAL: &str = "vdet_histogram_excluded_total";
    pub const SUMMARY_FALLBACK_TOTAL: &str = "vdet_summary_fallback_total";

    // Chart metrics
    pub const CHART_REBUILDS_TOTAL: &str = "vdet_chart_rebuilds_total";
    pub const CHART_INSTANCES_LIVE: &str = "vdet_chart_instances_live";
    pub const REDRAWS_CANCELLED_TOTAL: &str = "vdet_redraws_cancelled_total";
}

/// Record one overlay render and the number of boxes it drew.
pub fn record_overlay_render(boxes: usize) {
    counter!(names::OVERLAY_RENDERS_TOTAL).increment(1);
    counter!(names::OVERLAY_BOXES_DRAWN_TOTAL).increment(boxes as u64);
}

/// Record a render skipped because no drawing surface was attached.
pub fn record_render_noop() {
    counter!(names::OVERLAY_RENDER_NOOPS_TOTAL).increment(1);
}

/// Record how many detections a frame lookup returned.
pub fn record_frame_lookup(detections: usize) {
    histogram!(names::FRAME_DETECTIONS).record(detections as f64);
}

/// Record detections dropped from the timeline histogram.
pub fn record_histogram_excluded(count: u64) {
    if count > 0 {
        counter!(names::HISTOGRAM_EXCLUDED_TOTAL).increment(count);
    }
}

/// Record that a summary had to be tallied locally.
pub fn record_summary_fallback() {
    counter!(names::SUMMARY_FALLBACK_TOTAL).increment(1);
}

/// Record a chart rebuild.
pub fn record_chart_rebuild(kind: ChartKind) {
    let labels = [("kind", kind.as_str().to_string())];
    counter!(names::CHART_REBUILDS_TOTAL, &labels).increment(1);
}

/// Set the number of live chart instances.
pub fn set_live_charts(count: usize) {
    gauge!(names::CHART_INSTANCES_LIVE).set(count as f64);
}

/// Record pending redraw callbacks cancelled at teardown.
pub fn record_redraws_cancelled(count: usize) {
    if count > 0 {
        counter!(names::REDRAWS_CANCELLED_TOTAL).increment(count as u64);
    }
}
