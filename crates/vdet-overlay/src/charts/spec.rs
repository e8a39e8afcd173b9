//! Chart specifications built from aggregated detections.
//!
//! A [`ChartSpec`] is everything a chart library needs to draw one of the
//! three analytics charts. Specs are plain data (serializable) so any
//! backend can consume them.

use serde::{Deserialize, Serialize};
use vdet_models::timestamp::to_fixed;
use vdet_models::{Color, DetectionSummary};

use super::ChartKind;
use crate::aggregate::TimeHistogram;
use crate::palette::chart_palette;

/// Title of the bar chart.
pub const BAR_TITLE: &str = "Detections by Object Type";

/// Title of the pie chart.
pub const PIE_TITLE: &str = "Object Distribution";

/// Title of the timeline chart.
pub const TIMELINE_TITLE: &str = "Detection Activity Over Time";

/// Timeline line color.
pub const TIMELINE_COLOR: Color = Color::rgb(59, 130, 246);

/// Where a chart legend goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPosition {
    Top,
    Bottom,
}

/// Value axis settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisOptions {
    pub begin_at_zero: bool,
    pub step_size: f64,
}

impl AxisOptions {
    /// Integer counts starting from zero.
    pub fn counts() -> Self {
        Self {
            begin_at_zero: true,
            step_size: 1.0,
        }
    }
}

/// One data series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<u64>,
    pub background: Vec<Color>,
    pub border: Vec<Color>,
    pub border_width: f64,
    pub fill: bool,
    /// Line smoothing (0 = straight segments)
    pub tension: f64,
}

/// A complete chart description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
    /// `None` hides the legend
    pub legend: Option<LegendPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<AxisOptions>,
    /// Per-label tooltip text (empty when the library default is used)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tooltips: Vec<String>,
}

impl ChartSpec {
    /// Values of the first dataset.
    pub fn values(&self) -> &[u64] {
        self.datasets
            .first()
            .map(|d| d.data.as_slice())
            .unwrap_or(&[])
    }
}

/// Class counts with their series colors, in summary order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSeries {
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
    pub background: Vec<Color>,
    pub border: Vec<Color>,
}

impl ClassSeries {
    pub fn from_summary(summary: &DetectionSummary) -> Self {
        let labels: Vec<String> = summary.by_class.keys().cloned().collect();
        let counts: Vec<u64> = summary.by_class.values().copied().collect();
        let (background, border) = chart_palette(labels.len()).into_iter().unzip();
        Self {
            labels,
            counts,
            background,
            border,
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    fn display_labels(&self) -> Vec<String> {
        self.labels.iter().map(|l| capitalize(l)).collect()
    }

    fn dataset(&self, label: Option<&str>) -> ChartDataset {
        ChartDataset {
            label: label.map(str::to_string),
            data: self.counts.clone(),
            background: self.background.clone(),
            border: self.border.clone(),
            border_width: 2.0,
            fill: false,
            tension: 0.0,
        }
    }
}

/// Upper-case the first character: `"traffic light"` → `"Traffic light"`.
pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Tooltip text `"{label}: {value} ({pct:.1}%)"` for each value.
///
/// A zero total yields `0.0%` for every entry.
pub fn percentage_labels(labels: &[String], values: &[u64]) -> Vec<String> {
    let total: u64 = values.iter().sum();
    labels
        .iter()
        .zip(values)
        .map(|(label, &value)| {
            let percentage = if total == 0 {
                0.0
            } else {
                value as f64 / total as f64 * 100.0
            };
            format!("{}: {} ({}%)", label, value, to_fixed(percentage, 1))
        })
        .collect()
}

/// Grouped bar counts by class.
pub fn bar_chart_spec(series: &ClassSeries) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Bar,
        title: BAR_TITLE.to_string(),
        labels: series.display_labels(),
        datasets: vec![series.dataset(Some("Number of Detections"))],
        legend: None,
        y_axis: Some(AxisOptions::counts()),
        tooltips: Vec::new(),
    }
}

/// Proportional distribution by class with percentage tooltips.
pub fn pie_chart_spec(series: &ClassSeries) -> ChartSpec {
    let labels = series.display_labels();
    ChartSpec {
        kind: ChartKind::Pie,
        title: PIE_TITLE.to_string(),
        tooltips: percentage_labels(&labels, &series.counts),
        labels,
        datasets: vec![series.dataset(None)],
        legend: Some(LegendPosition::Bottom),
        y_axis: None,
    }
}

/// Line-style counts per time bucket.
pub fn timeline_chart_spec(histogram: &TimeHistogram) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Timeline,
        title: TIMELINE_TITLE.to_string(),
        labels: histogram.labels.clone(),
        datasets: vec![ChartDataset {
            label: Some("Detections per Interval".to_string()),
            data: histogram.counts.clone(),
            background: vec![TIMELINE_COLOR.with_alpha(0.1)],
            border: vec![TIMELINE_COLOR],
            border_width: 2.0,
            fill: true,
            tension: 0.4,
        }],
        legend: None,
        y_axis: Some(AxisOptions::counts()),
        tooltips: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn summary(entries: &[(&str, u64)]) -> DetectionSummary {
        let by_class: IndexMap<String, u64> =
            entries.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        DetectionSummary {
            total: by_class.values().sum(),
            unique_classes: by_class.len() as u64,
            by_class,
        }
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("person"), "Person");
        assert_eq!(capitalize("traffic light"), "Traffic light");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("éclair"), "Éclair");
    }

    #[test]
    fn test_bar_chart_spec() {
        let series = ClassSeries::from_summary(&summary(&[("person", 3), ("car", 1)]));
        let spec = bar_chart_spec(&series);
        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(spec.title, BAR_TITLE);
        assert_eq!(spec.labels, vec!["Person", "Car"]);
        assert_eq!(spec.values(), &[3, 1]);
        assert_eq!(spec.legend, None);
        assert_eq!(spec.datasets[0].background.len(), 2);
        assert_eq!(spec.datasets[0].background[1].to_css(), "hsla(137, 70%, 60%, 0.8)");
    }

    #[test]
    fn test_pie_percentages() {
        let series = ClassSeries::from_summary(&summary(&[("person", 3), ("car", 1)]));
        let spec = pie_chart_spec(&series);
        assert_eq!(spec.legend, Some(LegendPosition::Bottom));
        assert_eq!(spec.tooltips, vec!["Person: 3 (75.0%)", "Car: 1 (25.0%)"]);
    }

    #[test]
    fn test_percentages_with_zero_total() {
        let labels = vec!["Car".to_string()];
        assert_eq!(percentage_labels(&labels, &[0]), vec!["Car: 0 (0.0%)"]);
    }

    #[test]
    fn test_percentage_ties_round_up() {
        // 1/16 is 6.25%, an exact tie at one decimal
        let labels = vec!["Car".to_string(), "Person".to_string()];
        assert_eq!(
            percentage_labels(&labels, &[1, 15]),
            vec!["Car: 1 (6.3%)", "Person: 15 (93.8%)"]
        );
    }

    #[test]
    fn test_timeline_spec() {
        let histogram = TimeHistogram {
            labels: vec!["0s".to_string(), "5s".to_string()],
            counts: vec![4, 2],
            excluded: 0,
        };
        let spec = timeline_chart_spec(&histogram);
        assert_eq!(spec.kind, ChartKind::Timeline);
        assert_eq!(spec.labels, vec!["0s", "5s"]);
        assert_eq!(spec.values(), &[4, 2]);
        assert!(spec.datasets[0].fill);
        assert_eq!(spec.datasets[0].border[0].to_css(), "#3B82F6");
    }

    #[test]
    fn test_spec_serializes() {
        let series = ClassSeries::from_summary(&summary(&[("dog", 2)]));
        let json = serde_json::to_string(&bar_chart_spec(&series)).unwrap();
        assert!(json.contains(r#""kind":"bar""#));
        assert!(json.contains("Dog"));
    }
}
