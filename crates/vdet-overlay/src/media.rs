//! Host media element abstraction.
//!
//! The host owns the actual `<video>` element (or decoder); this
//! crate only reads and moves its playback position.

use tracing::debug;

/// Playback rates offered by the player's speed menu.
pub const SUPPORTED_SPEEDS: &[f64] = &[0.25, 0.5, 1.0, 1.5, 2.0];

/// The subset of a media element the playback session drives.
pub trait MediaElement {
    /// Current media time in seconds.
    fn current_time(&self) -> f64;

    /// Move the playback position.
    fn set_current_time(&mut self, seconds: f64);

    /// Media duration in seconds, when known.
    fn duration(&self) -> Option<f64>;

    /// Real-time to media-time ratio.
    fn playback_rate(&self) -> f64;

    /// Change the real-time to media-time ratio.
    fn set_playback_rate(&mut self, rate: f64);

    fn is_paused(&self) -> bool;

    fn play(&mut self);

    fn pause(&mut self);
}

/// A media element driven by an explicit clock instead of a decoder.
///
/// Used for headless replay and tests. Times are clamped to
/// `[0, duration]` like a browser video element, and playback pauses at
/// the end.
#[derive(Debug, Clone)]
pub struct SimulatedMedia {
    current_time: f64,
    duration: Option<f64>,
    rate: f64,
    paused: bool,
}

impl SimulatedMedia {
    /// Create a paused element at time zero.
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            current_time: 0.0,
            duration,
            rate: 1.0,
            paused: true,
        }
    }

    /// Advance by `real_secs` of wall time if playing.
    ///
    /// Media time moves by `real_secs * playback_rate`. Returns the new
    /// media time.
    pub fn advance(&mut self, real_secs: f64) -> f64 {
        if self.paused || !real_secs.is_finite() || real_secs <= 0.0 {
            return self.current_time;
        }
        let target = self.current_time + real_secs * self.rate;
        self.set_current_time(target);
        if let Some(duration) = self.duration {
            if self.current_time >= duration {
                debug!(duration, "Simulated media reached the end");
                self.paused = true;
            }
        }
        self.current_time
    }

    fn clamp(&self, seconds: f64) -> f64 {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        match self.duration {
            Some(duration) => seconds.min(duration),
            None => seconds,
        }
    }
}

impl MediaElement for SimulatedMedia {
    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = self.clamp(seconds);
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn play(&mut self) {
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }
}
