//! Headless playback cursor over a trip's time range.

use crate::error::{Error, Result};

/// Default step for [`Timeline::step_forward`] / [`Timeline::step_backward`].
pub const DEFAULT_STEP_S: f64 = 0.1;

/// Current time within `[min, max]`, with play/pause and playback speed.
///
/// Every mutation keeps `current` inside the range.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    min: f64,
    max: f64,
    current: f64,
    speed: f64,
    playing: bool,
}

impl Timeline {
    /// Cursor at `min`, paused, at 1× speed.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let mut timeline = Self {
            min: 0.0,
            max: 0.0,
            current: 0.0,
            speed: 1.0,
            playing: false,
        };
        timeline.set_range(min, max)?;
        timeline.current = min;
        Ok(timeline)
    }

    /// Replace the range; `current` is clamped into it.
    pub fn set_range(&mut self, min: f64, max: f64) -> Result<()> {
        if !(min.is_finite() && max.is_finite() && max > min) {
            return Err(Error::InvalidArgument(format!(
                "timeline range must satisfy min < max, got [{min}, {max}]"
            )));
        }
        self.min = min;
        self.max = max;
        self.current = self.current.clamp(min, max);
        Ok(())
    }

    /// Range start.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Range end.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Cursor position.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Playback speed multiplier.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// True while playing.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// True once the cursor has reached the range end.
    pub fn at_end(&self) -> bool {
        self.current >= self.max
    }

    /// Move to `t`, clamped to the range. NaN is ignored.
    pub fn seek(&mut self, t: f64) {
        if !t.is_nan() {
            self.current = t.clamp(self.min, self.max);
        }
    }

    /// Pause and move forward by `dt`.
    pub fn step_forward(&mut self, dt: f64) {
        self.pause();
        self.seek(self.current + dt);
    }

    /// Pause and move back by `dt`.
    pub fn step_backward(&mut self, dt: f64) {
        self.pause();
        self.seek(self.current - dt);
    }

    /// Start playing; restarts from `min` when already at the end.
    pub fn play(&mut self) {
        if self.at_end() {
            self.current = self.min;
        }
        self.playing = true;
    }

    /// Stop playing.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Flip between playing and paused.
    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Set playback speed (must be > 0).
    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "playback speed must be > 0, got {speed}"
            )));
        }
        self.speed = speed;
        Ok(())
    }

    /// Advance by `elapsed_s` wall time scaled by speed, if playing.
    ///
    /// Pauses on reaching the end. Returns the new position.
    pub fn advance(&mut self, elapsed_s: f64) -> f64 {
        if self.playing && elapsed_s > 0.0 {
            self.seek(self.current + elapsed_s * self.speed);
            if self.at_end() {
                self.pause();
            }
        }
        self.current
    }
}
