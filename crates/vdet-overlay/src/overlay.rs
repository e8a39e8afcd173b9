//! Per-frame bounding box overlay.
//!
//! Box coordinates arrive in native video pixels and the surface is sized
//! to the native resolution, so nothing is scaled here. Display scaling is
//! the host's concern.

use tracing::debug;
use vdet_models::{Color, Detection};

use crate::clock::{FrameObserver, FrameTick};
use crate::config::OverlayConfig;
use crate::index::DetectionIndex;
use crate::palette::color_for;
use crate::surface::{CanvasSize, DrawingSurface, Font, Rect};

/// Outcome of one render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Whether a surface was available
    pub drawn: bool,
    /// Boxes drawn
    pub boxes: usize,
}

/// Geometry of a detection's box and label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub text: String,
    pub color: Color,
    pub box_rect: Rect,
    pub background: Rect,
    pub text_x: f64,
    pub text_y: f64,
}

/// Draws bounding boxes and labels for the current frame.
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    stroke_width: f64,
    font: Font,
    label_height: f64,
    label_padding: f64,
    label_inset_x: f64,
    label_baseline_offset: f64,
    text_color: Color,
}

impl OverlayRenderer {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            stroke_width: config.stroke_width,
            font: config.label_font.clone(),
            label_height: config.label_height,
            label_padding: config.label_padding,
            label_inset_x: config.label_inset_x,
            label_baseline_offset: config.label_baseline_offset,
            text_color: config.label_text_color,
        }
    }

    /// Compute where a detection's box and label go on `surface`.
    ///
    /// The label sits directly above the box and is not clamped to the
    /// surface, so boxes touching the top edge get labels drawn off-canvas.
    pub fn layout<S: DrawingSurface + ?Sized>(&self, surface: &S, detection: &Detection) -> LabelLayout {
        let bbox = &detection.bbox;
        let text = detection.label();
        let text_width = surface.measure_text(&text, &self.font);
        LabelLayout {
            color: color_for(&detection.class_name),
            box_rect: Rect::new(bbox.x1, bbox.y1, bbox.width(), bbox.height()),
            background: Rect::new(
                bbox.x1,
                bbox.y1 - self.label_height - self.label_padding,
                text_width + 2.0 * self.label_inset_x,
                self.label_height + self.label_padding,
            ),
            text_x: bbox.x1 + self.label_inset_x,
            text_y: bbox.y1 - self.label_baseline_offset,
            text,
        }
    }

    /// Clear the surface and draw `detections` in order.
    ///
    /// Without a surface this is a no-op.
    pub fn render<S: DrawingSurface + ?Sized>(
        &self,
        surface: Option<&mut S>,
        detections: &[&Detection],
    ) -> RenderStats {
        let Some(surface) = surface else {
            crate::metrics::record_render_noop();
            return RenderStats::default();
        };

        surface.clear();
        for detection in detections {
            let layout = self.layout(&*surface, detection);
            surface.stroke_rect(layout.box_rect, &layout.color, self.stroke_width);
            surface.fill_rect(layout.background, &layout.color);
            surface.fill_text(
                &layout.text,
                layout.text_x,
                layout.text_y,
                &self.text_color,
                &self.font,
            );
        }

        crate::metrics::record_overlay_render(detections.len());
        RenderStats {
            drawn: true,
            boxes: detections.len(),
        }
    }
}

/// The frame-clock observer behind the overlay.
///
/// On each tick it resolves the frame's detections and redraws the surface.
#[derive(Debug)]
pub struct OverlayPipeline<S> {
    index: DetectionIndex,
    renderer: OverlayRenderer,
    surface: Option<S>,
    current_frame: Option<u64>,
    current: Vec<Detection>,
    last_stats: RenderStats,
}

impl<S: DrawingSurface> OverlayPipeline<S> {
    pub fn new(index: DetectionIndex, renderer: OverlayRenderer, surface: Option<S>) -> Self {
        Self {
            index,
            renderer,
            surface,
            current_frame: None,
            current: Vec::new(),
            last_stats: RenderStats::default(),
        }
    }

    /// Look up `frame` and redraw.
    pub fn show_frame(&mut self, frame: u64) -> RenderStats {
        let detections = self.index.detections_for_frame(frame);
        crate::metrics::record_frame_lookup(detections.len());
        let stats = self.renderer.render(self.surface.as_mut(), &detections);
        debug!(frame, detections = detections.len(), drawn = stats.drawn, "Overlay frame rendered");

        self.current = detections.into_iter().cloned().collect();
        self.current_frame = Some(frame);
        self.last_stats = stats;
        stats
    }

    /// Redraw the current frame (after a dataset or surface change).
    pub fn refresh(&mut self) -> Option<RenderStats> {
        self.current_frame.map(|frame| self.show_frame(frame))
    }

    /// Swap in a new detection set.
    pub fn replace_index(&mut self, index: DetectionIndex) {
        self.index = index;
    }

    /// Attach a surface sized to `native`.
    pub fn attach_surface(&mut self, mut surface: S, native: CanvasSize) {
        surface.resize(native);
        self.surface = Some(surface);
    }

    /// Detach and return the surface.
    pub fn detach_surface(&mut self) -> Option<S> {
        self.surface.take()
    }

    /// Resize the attached surface, if any.
    pub fn resize_surface(&mut self, native: CanvasSize) {
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(native);
        }
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn current_frame(&self) -> Option<u64> {
        self.current_frame
    }

    /// Detections drawn for the current frame.
    pub fn current_detections(&self) -> &[Detection] {
        &self.current
    }

    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    pub fn index(&self) -> &DetectionIndex {
        &self.index
    }
}

impl<S: DrawingSurface> FrameObserver for OverlayPipeline<S> {
    fn on_frame(&mut self, tick: &FrameTick) {
        self.show_frame(tick.frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};
    use vdet_models::BoundingBox;

    fn detection(frame: u64, class_name: &str, bbox: BoundingBox) -> Detection {
        Detection::new(frame, frame as f64 / 25.0, class_name, 0.9534, bbox)
    }

    fn surface() -> RecordingSurface {
        RecordingSurface::new(CanvasSize::new(1280, 720))
    }

    #[test]
    fn test_render_draws_box_label_background_and_text() {
        let renderer = OverlayRenderer::new(&OverlayConfig::default());
        let mut surface = surface();
        let d = detection(0, "person", BoundingBox::new(100.0, 50.0, 300.0, 250.0));

        let stats = renderer.render(Some(&mut surface), &[&d]);
        assert_eq!(stats, RenderStats { drawn: true, boxes: 1 });

        let label = "person 95.3%";
        let text_width = surface.measure_text(label, &Font::default());
        let expected = vec![
            DrawCommand::ClearRect {
                rect: Rect::new(0.0, 0.0, 1280.0, 720.0),
            },
            DrawCommand::StrokeRect {
                rect: Rect::new(100.0, 50.0, 200.0, 200.0),
                color: "#FF6B6B".to_string(),
                line_width: 3.0,
            },
            DrawCommand::FillRect {
                rect: Rect::new(100.0, 26.0, text_width + 10.0, 24.0),
                color: "#FF6B6B".to_string(),
            },
            DrawCommand::FillText {
                text: label.to_string(),
                x: 105.0,
                y: 42.0,
                color: "#FFFFFF".to_string(),
                font: "bold 16px Arial".to_string(),
            },
        ];
        assert_eq!(surface.commands(), expected.as_slice());
    }

    #[test]
    fn test_each_render_starts_from_blank() {
        let renderer = OverlayRenderer::new(&OverlayConfig::default());
        let mut surface = surface();
        let a = detection(0, "car", BoundingBox::new(0.0, 30.0, 10.0, 40.0));
        let b = detection(0, "dog", BoundingBox::new(5.0, 30.0, 15.0, 40.0));

        renderer.render(Some(&mut surface), &[&a, &b]);
        assert_eq!(surface.stroked_rects().len(), 2);
        renderer.render(Some(&mut surface), &[&a]);
        assert_eq!(surface.stroked_rects().len(), 1);
        renderer.render(Some(&mut surface), &[]);
        assert!(surface.stroked_rects().is_empty());
        assert_eq!(surface.clear_count(), 3);
    }

    #[test]
    fn test_render_without_surface_is_noop() {
        let renderer = OverlayRenderer::new(&OverlayConfig::default());
        let d = detection(0, "car", BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        let stats = renderer.render(None::<&mut RecordingSurface>, &[&d]);
        assert_eq!(stats, RenderStats::default());
    }

    #[test]
    fn test_label_is_not_clamped_at_top_edge() {
        let renderer = OverlayRenderer::new(&OverlayConfig::default());
        let layout = renderer.layout(
            &surface(),
            &detection(0, "car", BoundingBox::new(10.0, 5.0, 50.0, 60.0)),
        );
        assert_eq!(layout.background.y, -19.0);
        assert_eq!(layout.text_y, -3.0);
    }

    #[test]
    fn test_pipeline_tracks_current_frame() {
        let detections = vec![
            detection(4, "car", BoundingBox::new(0.0, 30.0, 10.0, 40.0)),
            detection(5, "person", BoundingBox::new(0.0, 30.0, 10.0, 40.0)),
            detection(4, "bus", BoundingBox::new(0.0, 30.0, 10.0, 40.0)),
        ];
        let mut pipeline = OverlayPipeline::new(
            DetectionIndex::new(detections),
            OverlayRenderer::new(&OverlayConfig::default()),
            Some(surface()),
        );

        pipeline.on_frame(&FrameTick { time: 0.16, frame: 4 });
        let classes: Vec<&str> = pipeline
            .current_detections()
            .iter()
            .map(|d| d.class_name.as_str())
            .collect();
        assert_eq!(classes, vec!["car", "bus"]);
        assert_eq!(pipeline.surface().unwrap().texts(), vec!["car 95.3%", "bus 95.3%"]);

        pipeline.on_frame(&FrameTick { time: 0.3, frame: 7 });
        assert!(pipeline.current_detections().is_empty());
        assert_eq!(pipeline.last_stats(), RenderStats { drawn: true, boxes: 0 });
    }

    #[test]
    fn test_pipeline_without_surface_still_resolves_detections() {
        let mut pipeline = OverlayPipeline::<RecordingSurface>::new(
            DetectionIndex::new(vec![detection(1, "cat", BoundingBox::new(0.0, 0.0, 1.0, 1.0))]),
            OverlayRenderer::new(&OverlayConfig::default()),
            None,
        );
        let stats = pipeline.show_frame(1);
        assert!(!stats.drawn);
        assert_eq!(pipeline.current_detections().len(), 1);
    }
}
