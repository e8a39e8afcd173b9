//! Drawing surface abstraction.
//!
//! The overlay draws through [`DrawingSurface`], which maps one-to-one onto
//! a 2D canvas context. [`RecordingSurface`] is a display-list backend
//! that captures the calls as serializable [`DrawCommand`]s, so a host can
//! replay them on whatever canvas it owns.

use serde::{Deserialize, Serialize};
use vdet_models::Color;

/// Surface dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Rectangle covering the whole surface.
    pub fn full_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f64, self.height as f64)
    }
}

/// A rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Font used for text drawing and measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size_px: f64,
    pub bold: bool,
}

impl Font {
    /// CSS font shorthand, e.g. `"bold 16px Arial"`.
    pub fn css(&self) -> String {
        if self.bold {
            format!("bold {}px {}", self.size_px, self.family)
        } else {
            format!("{}px {}", self.size_px, self.family)
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "Arial".to_string(),
            size_px: 16.0,
            bold: true,
        }
    }
}

/// A 2D drawing context.
pub trait DrawingSurface {
    /// Current pixel dimensions.
    fn size(&self) -> CanvasSize;

    /// Change the pixel dimensions; implementations clear the content.
    fn resize(&mut self, size: CanvasSize);

    /// Erase the whole surface.
    fn clear(&mut self);

    fn stroke_rect(&mut self, rect: Rect, color: &Color, line_width: f64);

    fn fill_rect(&mut self, rect: Rect, color: &Color);

    /// Rendered width of `text` in pixels.
    fn measure_text(&self, text: &str, font: &Font) -> f64;

    /// Draw `text` with its baseline starting at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: &Color, font: &Font);
}

impl<S: DrawingSurface + ?Sized> DrawingSurface for Box<S> {
    fn size(&self) -> CanvasSize {
        (**self).size()
    }

    fn resize(&mut self, size: CanvasSize) {
        (**self).resize(size)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn stroke_rect(&mut self, rect: Rect, color: &Color, line_width: f64) {
        (**self).stroke_rect(rect, color, line_width)
    }

    fn fill_rect(&mut self, rect: Rect, color: &Color) {
        (**self).fill_rect(rect, color)
    }

    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        (**self).measure_text(text, font)
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: &Color, font: &Font) {
        (**self).fill_text(text, x, y, color, font)
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    ClearRect {
        rect: Rect,
    },
    StrokeRect {
        rect: Rect,
        color: String,
        line_width: f64,
    },
    FillRect {
        rect: Rect,
        color: String,
    },
    FillText {
        text: String,
        x: f64,
        y: f64,
        color: String,
        font: String,
    },
}

/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f64 = 0.6;

/// Glyph advance for bold text.
const BOLD_GLYPH_ADVANCE: f64 = 0.65;

/// Display-list surface.
///
/// `clear` drops everything recorded so far, so after a render the list
/// holds exactly that frame's drawing. Text width is estimated from the
/// character count.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: CanvasSize,
    commands: Vec<DrawCommand>,
    clears: u64,
}

impl RecordingSurface {
    pub fn new(size: CanvasSize) -> Self {
        Self {
            size,
            commands: Vec::new(),
            clears: 0,
        }
    }

    /// Commands recorded since the last clear.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// How many times the surface has been cleared.
    pub fn clear_count(&self) -> u64 {
        self.clears
    }

    /// Recorded strokes (one per bounding box).
    pub fn stroked_rects(&self) -> Vec<&Rect> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokeRect { rect, .. } => Some(rect),
                _ => None,
            })
            .collect()
    }

    /// Recorded text strings, in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The display list as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.commands)
    }
}

impl DrawingSurface for RecordingSurface {
    fn size(&self) -> CanvasSize {
        self.size
    }

    fn resize(&mut self, size: CanvasSize) {
        self.size = size;
        self.commands.clear();
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.clears += 1;
        self.commands.push(DrawCommand::ClearRect {
            rect: self.size.full_rect(),
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: &Color, line_width: f64) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color: color.to_css(),
            line_width,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: &Color) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            color: color.to_css(),
        });
    }

    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        let advance = if font.bold {
            BOLD_GLYPH_ADVANCE
        } else {
            GLYPH_ADVANCE
        };
        text.chars().count() as f64 * font.size_px * advance
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: &Color, font: &Font) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
            color: color.to_css(),
            font: font.css(),
        });
    }
}
