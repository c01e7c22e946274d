//! Frame timing for tick-driven subsystems.
//!
//! Every periodic entry point in this crate takes a pair of elapsed times:
//! logical seconds (scaled, pausable) and real seconds (wall clock). [`Time`]
//! produces that pair as a [`FrameTime`].
//!
//! # Examples
//!
//! ```
//! use archetype_core::time::Time;
//! use std::time::Duration;
//!
//! let mut time = Time::new();
//! time.set_time_scale(0.5);
//!
//! let frame = time.advance(Duration::from_millis(100));
//! assert!((frame.elapse_seconds - 0.05).abs() < 1e-6);
//! assert!((frame.real_elapse_seconds - 0.1).abs() < 1e-6);
//! ```

use std::time::{Duration, Instant};

/// Elapsed time for one tick: logical (scaled) and real seconds
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    pub elapse_seconds: f32,
    pub real_elapse_seconds: f32,
}

impl FrameTime {
    pub fn new(elapse_seconds: f32, real_elapse_seconds: f32) -> Self {
        Self {
            elapse_seconds,
            real_elapse_seconds,
        }
    }
}

/// Time source tracking logical and real elapsed time
#[derive(Clone, Debug)]
pub struct Time {
    /// Last frame pair
    frame: FrameTime,
    /// Total real time since creation
    real_elapsed: Duration,
    /// Total logical time since creation
    logical_elapsed: f64,
    /// Frame counter
    frame_count: u64,
    /// Time scale multiplier (1.0 = normal speed)
    time_scale: f32,
    /// Scale to restore on resume
    resume_scale: f32,
    /// Wall clock reading of the last `update`
    last_update: Instant,
}

impl Time {
    /// Create new Time
    pub fn new() -> Self {
        Self {
            frame: FrameTime::default(),
            real_elapsed: Duration::ZERO,
            logical_elapsed: 0.0,
            frame_count: 0,
            time_scale: 1.0,
            resume_scale: 1.0,
            last_update: Instant::now(),
        }
    }

    /// Advance by the wall-clock time since the previous call
    pub fn update(&mut self) -> FrameTime {
        let now = Instant::now();
        let real = now.duration_since(self.last_update);
        self.last_update = now;
        self.advance(real)
    }

    /// Advance by an explicit real duration
    pub fn advance(&mut self, real: Duration) -> FrameTime {
        let real_seconds = real.as_secs_f32();
        let logical_seconds = real_seconds * self.time_scale;

        self.real_elapsed += real;
        self.logical_elapsed += logical_seconds as f64;
        self.frame_count += 1;
        self.frame = FrameTime::new(logical_seconds, real_seconds);
        self.frame
    }

    /// Last frame pair
    pub fn frame(&self) -> FrameTime {
        self.frame
    }

    /// Total real time
    pub fn real_elapsed(&self) -> Duration {
        self.real_elapsed
    }

    /// Total logical time in seconds
    pub fn logical_elapsed_seconds(&self) -> f64 {
        self.logical_elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Set time scale (1.0 = normal, 0.5 = half speed, 2.0 = double speed)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
        if self.time_scale > 0.0 {
            self.resume_scale = self.time_scale;
        }
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Pause logical time; real time keeps running
    pub fn pause(&mut self) {
        self.time_scale = 0.0;
    }

    /// Resume at the last non-zero scale
    pub fn resume(&mut self) {
        self.time_scale = self.resume_scale;
    }

    pub fn is_paused(&self) -> bool {
        self.time_scale == 0.0
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_creation() {
        let time = Time::new();
        assert_eq!(time.frame_count(), 0);
        assert_eq!(time.time_scale(), 1.0);
    }

    #[test]
    fn test_pause_freezes_logical_time_only() {
        let mut time = Time::new();
        time.pause();
        let frame = time.advance(Duration::from_millis(500));
        assert_eq!(frame.elapse_seconds, 0.0);
        assert!((frame.real_elapse_seconds - 0.5).abs() < 1e-6);
        assert_eq!(time.logical_elapsed_seconds(), 0.0);
        assert_eq!(time.real_elapsed(), Duration::from_millis(500));
    }

    #[test]
    fn test_resume_restores_previous_scale() {
        let mut time = Time::new();
        time.set_time_scale(2.0);
        time.pause();
        assert!(time.is_paused());
        time.resume();
        assert_eq!(time.time_scale(), 2.0);
    }

    #[test]
    fn test_negative_scale_clamped() {
        let mut time = Time::new();
        time.set_time_scale(-3.0);
        assert!(time.is_paused());
    }
}
