//! Time management utilities
//!
//! Frames are paced against a fixed budget: whatever is left of the budget
//! after a frame's work is slept away, and an over-budget frame proceeds
//! immediately.

use std::time::{Duration, Instant};

/// Monotonic clock plus a sleep primitive
///
/// The driver only ever reads the clock and sleeps through this trait, so
/// tests can substitute a clock that advances on demand.
pub trait FrameClock {
    /// Current monotonic time
    fn now(&self) -> Instant;

    /// Block the calling thread for `duration`
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by [`Instant`] and [`std::thread::sleep`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl FrameClock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Timing of one paced frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaceReport {
    /// Time spent on the frame's work before pacing
    pub work: Duration,
    /// Time handed to the sleep primitive (zero when over budget)
    pub slept: Duration,
    /// Elapsed time re-measured after the sleep
    pub total: Duration,
}

impl PaceReport {
    /// Whether the frame's work alone exceeded the budget
    pub fn over_budget(&self, budget: Duration) -> bool {
        self.work >= budget
    }
}

/// Fixed-budget frame pacer
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    budget: Duration,
}

impl FramePacer {
    /// Create a pacer for the given per-frame budget
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    /// The per-frame budget
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Finish a frame that started at `frame_start`
    ///
    /// Sleeps for the remainder of the budget if any is left, then measures
    /// again. The second measurement is reported but never triggers another
    /// sleep.
    pub fn finish_frame<C: FrameClock>(&self, clock: &mut C, frame_start: Instant) -> PaceReport {
        let work = clock.now().saturating_duration_since(frame_start);
        if work >= self.budget {
            return PaceReport {
                work,
                slept: Duration::ZERO,
                total: work,
            };
        }

        let slept = self.budget - work;
        clock.sleep(slept);
        let total = clock.now().saturating_duration_since(frame_start);

        PaceReport { work, slept, total }
    }
}

/// High-precision timer for frame statistics
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Timer {
    /// Create a new timer starting at `now`
    pub fn new(now: Instant) -> Self {
        Self {
            last_frame: now,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Record the end of a frame (should be called once per frame)
    pub fn tick(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_frame);
        self.delta_time = elapsed.as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}
