//! Playback session: the video player with its detection overlay.
//!
//! A [`PlaybackSession`] owns the host media element and a [`FrameClock`]
//! whose first observer is the [`OverlayPipeline`]. Every time update the
//! host forwards runs clock → index → renderer synchronously before the
//! call returns.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vdet_models::timestamp::format_seconds;
use vdet_models::{Color, Detection, VideoAggregate, VideoId, VideoMetadata};

use crate::clock::{FrameClock, FrameObserver, FrameStep, FrameTick, ObserverId};
use crate::config::OverlayConfig;
use crate::error::{OverlayError, OverlayResult};
use crate::index::DetectionIndex;
use crate::logging::{Component, SessionLogger};
use crate::media::MediaElement;
use crate::overlay::{OverlayPipeline, OverlayRenderer};
use crate::palette::color_for;
use crate::scheduler::{CallbackHandle, CallbackRegistry, FrameScheduler};
use crate::surface::{CanvasSize, DrawingSurface};

/// Frame and time readout under the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub frame: u64,
    pub total_frames: u64,
    pub time: f64,
    pub duration: f64,
}

impl FrameInfo {
    /// `"Frame: 51 / 1500"`
    pub fn frame_label(&self) -> String {
        format!("Frame: {} / {}", self.frame, self.total_frames)
    }

    /// `"Time: 2.04s / 60.00s"`
    pub fn time_label(&self) -> String {
        format!(
            "Time: {} / {}",
            format_seconds(self.time),
            format_seconds(self.duration)
        )
    }
}

/// One entry of the current-frame detection list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionListItem {
    pub class_name: String,
    /// Swatch color, same as the box
    pub color: Color,
    /// e.g. `"95.3%"`
    pub confidence: String,
}

impl From<&Detection> for DetectionListItem {
    fn from(detection: &Detection) -> Self {
        Self {
            class_name: detection.class_name.clone(),
            color: color_for(&detection.class_name),
            confidence: detection.confidence_label(),
        }
    }
}

/// A video player with its synchronized overlay.
pub struct PlaybackSession<M, S> {
    media: M,
    clock: FrameClock,
    pipeline: Rc<RefCell<OverlayPipeline<S>>>,
    video_id: VideoId,
    metadata: VideoMetadata,
    config: OverlayConfig,
    logger: SessionLogger,
    redraws: CallbackRegistry,
    closed: bool,
}

impl<M, S> PlaybackSession<M, S>
where
    M: MediaElement,
    S: DrawingSurface + 'static,
{
    /// Start a session for `aggregate`. The overlay draws nothing until a
    /// surface is attached.
    pub fn new(media: M, aggregate: &VideoAggregate, config: OverlayConfig) -> Self {
        let logger = SessionLogger::new(&aggregate.video_id, Component::Playback);
        let metadata = aggregate.metadata_or_default().into_owned();
        let fps = config.fps_or_default(metadata.fps);

        let pipeline = Rc::new(RefCell::new(OverlayPipeline::new(
            DetectionIndex::new(aggregate.detections().to_vec()),
            OverlayRenderer::new(&config),
            None,
        )));
        let mut clock = FrameClock::new(Some(fps));
        let observer = Rc::clone(&pipeline);
        clock.subscribe(move |tick: &FrameTick| observer.borrow_mut().on_frame(tick));

        let session = Self {
            media,
            clock,
            pipeline,
            video_id: aggregate.video_id.clone(),
            metadata,
            config,
            logger,
            redraws: CallbackRegistry::new(),
            closed: false,
        };
        session.report_validation(aggregate);
        session
            .logger
            .log_dataset_loaded(aggregate.detections().len(), fps);
        session
    }

    fn ensure_open(&self) -> OverlayResult<()> {
        if self.closed {
            Err(OverlayError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn report_validation(&self, aggregate: &VideoAggregate) {
        for (index, reason) in aggregate.validation_issues() {
            self.logger.log_malformed_detection(index, &reason);
        }
    }

    /// Native video resolution from the metadata.
    pub fn native_size(&self) -> CanvasSize {
        CanvasSize::new(self.metadata.width, self.metadata.height)
    }

    /// Attach the overlay surface, size it to the native resolution and draw
    /// the current frame.
    pub fn attach_surface(&mut self, surface: S) -> OverlayResult<FrameTick> {
        self.ensure_open()?;
        let native = self.native_size();
        self.pipeline.borrow_mut().attach_surface(surface, native);
        info!(
            video_id = %self.video_id,
            width = native.width,
            height = native.height,
            "Overlay surface attached"
        );
        self.handle_time_update()
    }

    /// The media element reported its intrinsic size.
    ///
    /// The surface follows the native resolution, not the display size.
    pub fn on_metadata_loaded(&mut self, native: CanvasSize) -> OverlayResult<FrameTick> {
        self.ensure_open()?;
        self.metadata.width = native.width;
        self.metadata.height = native.height;
        self.pipeline.borrow_mut().resize_surface(native);
        self.handle_time_update()
    }

    /// Forward a time-update event from the media element.
    pub fn handle_time_update(&mut self) -> OverlayResult<FrameTick> {
        self.ensure_open()?;
        Ok(self.clock.on_time_advance(self.media.current_time()))
    }

    /// Step one frame backward or forward, playing or paused.
    pub fn step_frame(&mut self, step: FrameStep) -> OverlayResult<FrameTick> {
        self.ensure_open()?;
        Ok(self.clock.step_frame(&mut self.media, step))
    }

    /// Play if paused, pause if playing. Returns whether the media is now playing.
    pub fn toggle_play(&mut self) -> OverlayResult<bool> {
        self.ensure_open()?;
        if self.media.is_paused() {
            self.media.play();
        } else {
            self.media.pause();
        }
        Ok(!self.media.is_paused())
    }

    /// Change the playback rate. The frame index formula is unaffected.
    pub fn set_playback_speed(&mut self, rate: f64) -> OverlayResult<()> {
        self.ensure_open()?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(OverlayError::InvalidPlaybackSpeed(rate));
        }
        self.media.set_playback_rate(rate);
        debug!(video_id = %self.video_id, rate, "Playback speed changed");
        Ok(())
    }

    /// Seek to a fraction of the duration (a click on the progress bar).
    pub fn seek_to_fraction(&mut self, fraction: f64) -> OverlayResult<FrameTick> {
        self.ensure_open()?;
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.media.set_current_time(fraction * self.duration());
        self.handle_time_update()
    }

    /// Duration from the media element, else from the metadata.
    pub fn duration(&self) -> f64 {
        match self.media.duration() {
            Some(duration) if duration.is_finite() && duration > 0.0 => duration,
            _ => self.config.duration_or_default(self.metadata.duration),
        }
    }

    /// Playback position in [0, 1].
    pub fn progress_fraction(&self) -> f64 {
        let duration = self.duration();
        if duration > 0.0 {
            (self.media.current_time() / duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn frame_info(&self) -> FrameInfo {
        let time = self.media.current_time();
        FrameInfo {
            frame: self.clock.frame_at(time),
            total_frames: self.metadata.total_frames,
            time,
            duration: self.duration(),
        }
    }

    /// Detections of the frame last drawn.
    pub fn current_detections(&self) -> Ref<'_, [Detection]> {
        Ref::map(self.pipeline.borrow(), |p| p.current_detections())
    }

    pub fn current_detection_items(&self) -> Vec<DetectionListItem> {
        self.pipeline
            .borrow()
            .current_detections()
            .iter()
            .map(DetectionListItem::from)
            .collect()
    }

    /// Swap in a new detection set and redraw the current frame.
    pub fn replace_dataset(&mut self, aggregate: &VideoAggregate) -> OverlayResult<()> {
        self.ensure_open()?;
        let _span = self.logger.create_span().entered();

        if aggregate.video_id != self.video_id {
            self.video_id = aggregate.video_id.clone();
            self.logger = SessionLogger::new(&self.video_id, Component::Playback);
        }
        self.metadata = aggregate.metadata_or_default().into_owned();
        self.clock
            .set_fps(Some(self.config.fps_or_default(self.metadata.fps)));
        self.report_validation(aggregate);

        let native = self.native_size();
        {
            let mut pipeline = self.pipeline.borrow_mut();
            pipeline.replace_index(DetectionIndex::new(aggregate.detections().to_vec()));
            pipeline.resize_surface(native);
        }
        self.logger
            .log_dataset_loaded(aggregate.detections().len(), self.clock.fps());
        self.handle_time_update().map(|_| ())
    }

    /// Register another frame observer after the overlay.
    pub fn subscribe(&mut self, observer: impl FrameObserver + 'static) -> OverlayResult<ObserverId> {
        self.ensure_open()?;
        Ok(self.clock.subscribe(observer))
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.clock.unsubscribe(id)
    }

    /// Schedule an overlay repaint for the next animation frame.
    pub fn request_overlay_redraw(
        &mut self,
        scheduler: &mut dyn FrameScheduler,
    ) -> OverlayResult<CallbackHandle> {
        self.ensure_open()?;
        Ok(self.redraws.request(scheduler))
    }

    /// Run a scheduled repaint. Cancelled or unknown handles do nothing.
    pub fn run_overlay_redraw(&mut self, handle: CallbackHandle) -> bool {
        if self.closed || !self.redraws.complete(handle) {
            return false;
        }
        let mut pipeline = self.pipeline.borrow_mut();
        if pipeline.refresh().is_none() {
            let frame = self.clock.frame_at(self.media.current_time());
            pipeline.show_frame(frame);
        }
        true
    }

    pub fn pending_redraws(&self) -> usize {
        self.redraws.pending_count()
    }

    /// Release the session: observers, pending repaints and the surface.
    ///
    /// Returns the detached surface. Later calls fail with `SessionClosed`.
    pub fn teardown(&mut self, scheduler: &mut dyn FrameScheduler) -> Option<S> {
        if self.closed {
            return None;
        }
        let cancelled = self.redraws.cancel_all(scheduler);
        crate::metrics::record_redraws_cancelled(cancelled);
        let observers = self.clock.clear_observers();
        if !self.media.is_paused() {
            self.media.pause();
        }
        self.closed = true;

        self.logger.log_playback_teardown(observers, cancelled);
        self.pipeline.borrow_mut().detach_surface()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// Mutable access to the media element, e.g. to advance a simulated one.
    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn surface(&self) -> Option<Ref<'_, S>> {
        Ref::filter_map(self.pipeline.borrow(), |p| p.surface()).ok()
    }
}

impl<M, S> std::fmt::Debug for PlaybackSession<M, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("video_id", &self.video_id)
            .field("clock", &self.clock)
            .field("pending_redraws", &self.redraws.pending_count())
            .field("closed", &self.closed)
            .finish()
    }
}
