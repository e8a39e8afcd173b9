//! Playback time → frame index conversion.
//!
//! The [`FrameClock`] turns the host's coarse time-update events into
//! frame ticks and pushes each tick synchronously to its registered
//! observers. The frame index depends only on media time and frame rate:
//! `frame = floor(t * fps)`. Playback speed changes the pace of
//! time-update events but never the formula, and the clock keeps no
//! directional state, so seeking backwards behaves exactly like playing
//! forwards.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vdet_models::resolve_fps;

use crate::media::MediaElement;

/// A resolved playback position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameTick {
    /// Media time in seconds
    pub time: f64,
    /// Frame index derived from `time`
    pub frame: u64,
}

/// Direction of a single-frame step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStep {
    Backward,
    Forward,
}

impl FrameStep {
    /// `-1.0` or `1.0`.
    pub fn sign(&self) -> f64 {
        match self {
            FrameStep::Backward => -1.0,
            FrameStep::Forward => 1.0,
        }
    }
}

/// Receives every frame tick produced by a [`FrameClock`].
pub trait FrameObserver {
    fn on_frame(&mut self, tick: &FrameTick);
}

impl<F> FrameObserver for F
where
    F: FnMut(&FrameTick),
{
    fn on_frame(&mut self, tick: &FrameTick) {
        self(tick)
    }
}

/// Handle returned by [`FrameClock::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

/// Converts playback time into frame ticks and notifies observers.
pub struct FrameClock {
    fps: f64,
    last_tick: Option<FrameTick>,
    observers: Vec<(ObserverId, Box<dyn FrameObserver>)>,
    next_id: u64,
}

impl FrameClock {
    /// Create a clock; a missing, zero or non-finite rate becomes 25 fps.
    pub fn new(fps: Option<f64>) -> Self {
        Self {
            fps: resolve_fps(fps),
            last_tick: None,
            observers: Vec::new(),
            next_id: 0,
        }
    }

    /// Effective frames per second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration(&self) -> f64 {
        1.0 / self.fps
    }

    /// Replace the frame rate (e.g. when a new video is loaded).
    pub fn set_fps(&mut self, fps: Option<f64>) {
        self.fps = resolve_fps(fps);
    }

    /// `floor(t * fps)`; negative and non-finite times map to frame 0.
    pub fn frame_at(&self, time: f64) -> u64 {
        let frame = (time * self.fps).floor();
        if frame.is_finite() && frame > 0.0 {
            frame as u64
        } else {
            0
        }
    }

    /// The most recent tick, if any time update has been handled.
    pub fn last_tick(&self) -> Option<FrameTick> {
        self.last_tick
    }

    /// Register an observer; it is called on every subsequent tick.
    pub fn subscribe(&mut self, observer: impl FrameObserver + 'static) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Drop every observer; returns how many were registered.
    pub fn clear_observers(&mut self) -> usize {
        let count = self.observers.len();
        self.observers.clear();
        count
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Handle a time-update event.
    ///
    /// Computes the frame and runs every observer, in registration order,
    /// before returning.
    pub fn on_time_advance(&mut self, time: f64) -> FrameTick {
        let tick = FrameTick {
            time,
            frame: self.frame_at(time),
        };
        debug!(time, frame = tick.frame, "Frame tick");
        self.last_tick = Some(tick);
        for (_, observer) in self.observers.iter_mut() {
            observer.on_frame(&tick);
        }
        tick
    }

    /// Move the media by exactly one frame and handle the resulting time.
    ///
    /// Works the same whether the media is playing or paused. The host
    /// element may clamp the target (e.g. at zero), and the tick reflects
    /// the clamped time.
    pub fn step_frame(&mut self, media: &mut dyn MediaElement, step: FrameStep) -> FrameTick {
        let target = media.current_time() + step.sign() * self.frame_duration();
        media.set_current_time(target);
        self.on_time_advance(media.current_time())
    }
}

impl std::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameClock")
            .field("fps", &self.fps)
            .field("last_tick", &self.last_tick)
            .field("observers", &self.observers.len())
            .finish()
    }
}
