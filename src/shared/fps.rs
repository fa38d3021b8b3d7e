// This is free and unencumbered software released into the public domain.

use core::time::Duration;
use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

/// Source of monotonic time for frame bookkeeping.
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FpsSample {
    pub frames: u32,
    pub elapsed: Duration,
    pub fps: f64,
}

/// Counts delivered frames and produces an fps estimate once per window.
#[derive(Clone, Debug)]
pub struct FrameRateCounter {
    window: Duration,
    frames: u32,
    last_sample: Instant,
}

impl FrameRateCounter {
    pub fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            frames: 0,
            last_sample: now,
        }
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counts one frame delivered at `now`.
    ///
    /// Once at least one window has elapsed since the last sample, returns
    /// `frames / window_secs` and starts a new window at `now`.
    pub fn record_frame(&mut self, now: Instant) -> Option<FpsSample> {
        self.frames = self.frames.saturating_add(1);

        let elapsed = now.saturating_duration_since(self.last_sample);
        if elapsed < self.window {
            return None;
        }

        let sample = FpsSample {
            frames: self.frames,
            elapsed,
            fps: self.frames as f64 / self.window.as_secs_f64(),
        };
        self.reset(now);
        Some(sample)
    }

    pub fn reset(&mut self, now: Instant) {
        self.frames = 0;
        self.last_sample = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(5);

    #[test]
    fn test_no_sample_before_window() {
        let start = Instant::now();
        let mut counter = FrameRateCounter::new(WINDOW, start);
        for i in 1..=100 {
            let at = start + Duration::from_millis(49 * i);
            assert!(counter.record_frame(at).is_none());
        }
        assert_eq!(counter.frames(), 100);
    }

    #[test]
    fn test_sample_at_exact_window() {
        let start = Instant::now();
        let mut counter = FrameRateCounter::new(WINDOW, start);
        let sample = counter.record_frame(start + WINDOW).unwrap();
        assert_eq!(sample.frames, 1);
        assert_eq!(counter.frames(), 0);
    }

    #[test]
    fn test_27_frames_over_5_2_seconds() {
        let start = Instant::now();
        let mut counter = FrameRateCounter::new(WINDOW, start);
        for i in 1..27u64 {
            assert!(counter.record_frame(start + Duration::from_millis(190 * i)).is_none());
        }
        let sample = counter
            .record_frame(start + Duration::from_millis(5_200))
            .unwrap();
        assert_eq!(sample.frames, 27);
        assert_eq!(sample.elapsed, Duration::from_millis(5_200));
        assert!((sample.fps - 5.4).abs() < 1e-9);
    }

    #[test]
    fn test_window_restarts_after_sample() {
        let start = Instant::now();
        let mut counter = FrameRateCounter::new(WINDOW, start);
        let first = start + Duration::from_secs(6);
        assert!(counter.record_frame(first).is_some());
        assert!(counter.record_frame(first + Duration::from_secs(4)).is_none());
        let sample = counter.record_frame(first + WINDOW).unwrap();
        assert_eq!(sample.frames, 2);
    }

    #[test]
    fn test_manual_clock_shares_time() {
        let clock = ManualClock::default();
        let other = clock.clone();
        let before = clock.now();
        other.advance(Duration::from_millis(250));
        assert_eq!(clock.now() - before, Duration::from_millis(250));
    }
}
