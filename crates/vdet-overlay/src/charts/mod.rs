//! Analytics charts: specs, backends and instance lifecycle.
//!
//! - [`spec`] turns summaries and histograms into [`ChartSpec`]s
//! - [`registry`] owns at most one live chart instance per [`ChartKind`]

pub mod registry;
pub mod spec;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use registry::{
    ChartBackend, ChartRegistry, ChartState, RebuildOutcome, RecordedChartId,
    RecordingChartBackend,
};
pub use spec::{
    bar_chart_spec, capitalize, percentage_labels, pie_chart_spec, timeline_chart_spec,
    AxisOptions, ChartDataset, ChartSpec, ClassSeries, LegendPosition,
};

/// The three analytics charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Detections per class
    Bar,
    /// Share of detections per class
    Pie,
    /// Detections per time bucket
    Timeline,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Bar, ChartKind::Pie, ChartKind::Timeline];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
            ChartKind::Timeline => "timeline",
        }
    }

    fn index(self) -> usize {
        match self {
            ChartKind::Bar => 0,
            ChartKind::Pie => 1,
            ChartKind::Timeline => 2,
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let names: Vec<&str> = ChartKind::ALL.iter().map(ChartKind::as_str).collect();
        assert_eq!(names, vec!["bar", "pie", "timeline"]);
        assert_eq!(serde_json::to_string(&ChartKind::Timeline).unwrap(), r#""timeline""#);
        assert_eq!(ChartKind::Pie.to_string(), "pie");
    }
}
