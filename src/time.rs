//! Frame clock driving the simulation.
//!
//! The simulation clock is a tick counter: it starts at `0.0` and advances
//! by exactly one unit per step, so a particle's integration delta is the
//! number of ticks since it was last updated. Wall-clock time is only used
//! to measure the frame rate shown by the stats overlay.
//!
//! # Example
//!
//! ```
//! use gridswarm::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//! assert_eq!(clock.time(), 0.0);
//!
//! clock.advance();
//! assert_eq!(clock.time(), 1.0);
//! assert_eq!(clock.frame(), 1);
//! ```

use std::time::{Duration, Instant};

/// Tick clock with frame-rate measurement.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Global clock value fed to particle updates.
    time: f32,
    /// Total ticks since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
    paused: bool,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: Instant::now(),
            fps_update_interval: Duration::from_millis(500),
            paused: false,
        }
    }

    /// Advance the clock by one tick. Does nothing while paused.
    ///
    /// Returns the new clock value.
    pub fn advance(&mut self) -> f32 {
        if self.paused {
            return self.time;
        }

        self.time += 1.0;
        self.frame_count += 1;

        let now = Instant::now();
        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.time
    }

    /// Current clock value.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Total ticks since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Measured ticks per wall-clock second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.fps_update_time = Instant::now();
            self.fps_frame_count = self.frame_count;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Change how often the frame rate is recomputed.
    pub fn set_fps_interval(&mut self, interval: Duration) {
        self.fps_update_interval = interval;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
