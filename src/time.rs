//! Wall-clock frame timing for the viewer.
//!
//! The engine itself advances in abstract frames; this clock only
//! measures how fast the host is actually ticking, so the window title
//! can show an FPS figure and frame exports can report throughput.
//!
//! # Example
//!
//! ```ignore
//! use mwpe::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//! loop {
//!     let delta = clock.tick();
//!     println!("{:.1} fps ({:.1} ms)", clock.fps(), delta * 1000.0);
//! }
//! ```

use std::time::{Duration, Instant};

/// How often the FPS estimate is refreshed.
const FPS_SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Measures per-frame wall time and a smoothed FPS figure.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    sample_start: Instant,
    sample_frames: u32,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            sample_start: now,
            sample_frames: 0,
        }
    }

    /// Mark a frame boundary and return the seconds since the previous one.
    ///
    /// The FPS estimate averages whole frames over the last sample
    /// interval rather than inverting a single delta, so it stays steady
    /// under scheduler jitter.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_count += 1;
        self.sample_frames += 1;

        let sample_elapsed = now.duration_since(self.sample_start);
        if sample_elapsed >= FPS_SAMPLE_INTERVAL {
            self.fps = self.sample_frames as f32 / sample_elapsed.as_secs_f32();
            self.sample_start = now;
            self.sample_frames = 0;
        }

        self.delta_secs
    }

    /// Seconds since the previous frame boundary.
    #[inline]
    pub fn delta_secs(&self) -> f32 {
        self.delta_secs
    }

    /// Seconds since the clock was created.
    #[inline]
    pub fn elapsed_secs(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Total frames marked so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Smoothed frames per second, zero until the first sample completes.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn tick_measures_frame_delta() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(10));
        let delta = clock.tick();

        assert!(delta >= 0.009, "delta was {}", delta);
        assert_eq!(clock.frame_count(), 1);
    }

    #[test]
    fn fps_settles_after_a_full_sample() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.fps(), 0.0);

        // ~60 frames over ~600ms crosses one sample interval.
        for _ in 0..60 {
            thread::sleep(Duration::from_millis(10));
            clock.tick();
        }

        let fps = clock.fps();
        assert!(fps > 20.0 && fps < 200.0, "fps was {}", fps);
    }

    #[test]
    fn elapsed_accumulates_across_frames() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(20));
        clock.tick();
        thread::sleep(Duration::from_millis(20));
        clock.tick();

        assert!(clock.elapsed_secs() >= 0.039);
        assert_eq!(clock.frame_count(), 2);
    }
}
