//! Overlay and analytics configuration.

use serde::{Deserialize, Serialize};
use vdet_models::{Color, DEFAULT_DURATION_SECS, DEFAULT_FPS};

use crate::error::{OverlayError, OverlayResult};
use crate::surface::Font;

/// Styling and aggregation settings shared by the overlay and the charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    // === Bounding boxes ===
    /// Stroke width of bounding boxes in pixels (default: 3)
    pub stroke_width: f64,

    // === Labels ===
    /// Label font (default: bold 16px Arial)
    pub label_font: Font,
    /// Height of the label text box in pixels (default: 20)
    pub label_height: f64,
    /// Vertical padding between label box and bounding box (default: 4)
    pub label_padding: f64,
    /// Horizontal inset of the label text inside its background (default: 5)
    pub label_inset_x: f64,
    /// Distance from the box top edge to the label baseline (default: 8)
    pub label_baseline_offset: f64,
    /// Label text color (default: white)
    pub label_text_color: Color,

    // === Aggregation ===
    /// Width of timeline buckets in seconds (default: 5)
    pub bucket_interval_secs: f64,
    /// Frame rate assumed when metadata lacks one (default: 25)
    pub default_fps: f64,
    /// Duration assumed when metadata lacks one (default: 60)
    pub default_duration_secs: f64,
    /// Number of classes in the "top objects" card (default: 3)
    pub top_objects: usize,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            stroke_width: 3.0,
            label_font: Font::default(),
            label_height: 20.0,
            label_padding: 4.0,
            label_inset_x: 5.0,
            label_baseline_offset: 8.0,
            label_text_color: Color::WHITE,
            bucket_interval_secs: 5.0,
            default_fps: DEFAULT_FPS,
            default_duration_secs: DEFAULT_DURATION_SECS,
            top_objects: 3,
        }
    }
}

/// Prefix of the environment variables read by [`OverlayConfig::from_env`].
pub const ENV_PREFIX: &str = "VDET_";

impl OverlayConfig {
    /// Create config from environment variables, falling back to defaults
    /// for anything missing, unparsable or out of range.
    pub fn from_env() -> Self {
        Self::from_env_prefixed(ENV_PREFIX)
    }

    /// [`OverlayConfig::from_env`] over `{prefix}STROKE_WIDTH` etc.
    pub fn from_env_prefixed(prefix: &str) -> Self {
        Self::try_from_env_prefixed(prefix).unwrap_or_default()
    }

    /// Create config from environment variables.
    ///
    /// Missing or unparsable variables use defaults; parsable values that
    /// are out of range are reported.
    pub fn try_from_env() -> OverlayResult<Self> {
        Self::try_from_env_prefixed(ENV_PREFIX)
    }

    pub fn try_from_env_prefixed(prefix: &str) -> OverlayResult<Self> {
        let env = EnvReader { prefix };
        let defaults = Self::default();
        let config = Self {
            stroke_width: env.parse("STROKE_WIDTH", defaults.stroke_width),
            label_font: Font {
                family: env
                    .var("LABEL_FONT_FAMILY")
                    .unwrap_or_else(|| defaults.label_font.family.clone()),
                size_px: env.parse("LABEL_FONT_SIZE", defaults.label_font.size_px),
                bold: env.parse("LABEL_FONT_BOLD", defaults.label_font.bold),
            },
            label_height: env.parse("LABEL_HEIGHT", defaults.label_height),
            label_padding: env.parse("LABEL_PADDING", defaults.label_padding),
            label_inset_x: env.parse("LABEL_INSET_X", defaults.label_inset_x),
            label_baseline_offset: env
                .parse("LABEL_BASELINE_OFFSET", defaults.label_baseline_offset),
            label_text_color: defaults.label_text_color,
            bucket_interval_secs: env.parse("BUCKET_INTERVAL_SECS", defaults.bucket_interval_secs),
            default_fps: env.parse("DEFAULT_FPS", defaults.default_fps),
            default_duration_secs: env
                .parse("DEFAULT_DURATION_SECS", defaults.default_duration_secs),
            top_objects: env.parse("TOP_OBJECTS", defaults.top_objects),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the numeric settings are usable.
    pub fn validate(&self) -> OverlayResult<()> {
        let positive = [
            ("stroke_width", self.stroke_width),
            ("label_font.size_px", self.label_font.size_px),
            ("bucket_interval_secs", self.bucket_interval_secs),
            ("default_fps", self.default_fps),
            ("default_duration_secs", self.default_duration_secs),
        ];
        for (key, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(OverlayError::invalid_config(key, value));
            }
        }
        let non_negative = [
            ("label_height", self.label_height),
            ("label_padding", self.label_padding),
            ("label_inset_x", self.label_inset_x),
        ];
        for (key, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(OverlayError::invalid_config(key, value));
            }
        }
        Ok(())
    }

    /// Resolve a metadata frame rate against the configured default.
    pub fn fps_or_default(&self, fps: Option<f64>) -> f64 {
        match fps {
            Some(f) if f.is_finite() && f > 0.0 => f,
            _ => self.default_fps,
        }
    }

    /// Resolve a metadata duration against the configured default.
    pub fn duration_or_default(&self, duration: Option<f64>) -> f64 {
        match duration {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => self.default_duration_secs,
        }
    }
}

struct EnvReader<'a> {
    prefix: &'a str,
}

impl EnvReader<'_> {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(format!("{}{}", self.prefix, key)).ok()
    }

    fn parse<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        self.var(key)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_player() {
        let config = OverlayConfig::default();
        assert_eq!(config.stroke_width, 3.0);
        assert_eq!(config.label_height, 20.0);
        assert_eq!(config.label_padding, 4.0);
        assert_eq!(config.bucket_interval_secs, 5.0);
        assert_eq!(config.default_fps, 25.0);
        assert_eq!(config.default_duration_secs, 60.0);
        assert_eq!(config.label_font.css(), "bold 16px Arial");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = OverlayConfig {
            bucket_interval_secs: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(OverlayError::InvalidConfig { ref key, .. }) if key == "bucket_interval_secs"
        ));
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("VDET_CFG_OVERRIDE_STROKE_WIDTH", "2.5");
        std::env::set_var("VDET_CFG_OVERRIDE_TOP_OBJECTS", " 5 ");
        std::env::set_var("VDET_CFG_OVERRIDE_LABEL_HEIGHT", "tall");

        let config = OverlayConfig::try_from_env_prefixed("VDET_CFG_OVERRIDE_").unwrap();
        assert_eq!(config.stroke_width, 2.5);
        assert_eq!(config.top_objects, 5);
        // Unparsable values keep the default
        assert_eq!(config.label_height, 20.0);
        assert_eq!(config.bucket_interval_secs, 5.0);
    }

    #[test]
    fn test_env_out_of_range_is_reported() {
        std::env::set_var("VDET_CFG_RANGE_BUCKET_INTERVAL_SECS", "0");
        std::env::set_var("VDET_CFG_RANGE_STROKE_WIDTH", "2.0");

        assert!(matches!(
            OverlayConfig::try_from_env_prefixed("VDET_CFG_RANGE_"),
            Err(OverlayError::InvalidConfig { ref key, ref value })
                if key == "bucket_interval_secs" && value == "0"
        ));
        // The lenient loader drops every override, not just the bad one
        assert_eq!(
            OverlayConfig::from_env_prefixed("VDET_CFG_RANGE_"),
            OverlayConfig::default()
        );
    }

    #[test]
    fn test_fps_or_default() {
        let config = OverlayConfig::default();
        assert_eq!(config.fps_or_default(None), 25.0);
        assert_eq!(config.fps_or_default(Some(0.0)), 25.0);
        assert_eq!(config.fps_or_default(Some(f64::NAN)), 25.0);
        assert_eq!(config.fps_or_default(Some(30.0)), 30.0);
        assert_eq!(config.duration_or_default(None), 60.0);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: OverlayConfig =
            serde_json::from_str(r#"{"stroke_width": 2.0, "bucket_interval_secs": 10.0}"#).unwrap();
        assert_eq!(config.stroke_width, 2.0);
        assert_eq!(config.bucket_interval_secs, 10.0);
        assert_eq!(config.label_height, 20.0);
    }
}
