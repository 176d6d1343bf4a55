//! Clock sources for the frame loop.
//!
//! Every timed subsystem reads the same monotonic millisecond counter through
//! [`Clock::now_ms`]. The main loop suspends exactly once per frame, inside
//! [`Clock::tick`], which also reports the elapsed frame time used to integrate
//! movement.

use std::time::{Duration, Instant};

const FPS_SAMPLE_COUNT: usize = 60;

pub trait Clock {
    /// Milliseconds elapsed since the clock was created.
    fn now_ms(&self) -> u64;

    /// Block until the next frame boundary and return the frame delta in seconds.
    fn tick(&mut self) -> f32;
}

/// Wall-clock pacing at a fixed target rate.
pub struct SystemClock {
    pub target_fps: u32,
    pub max_frame_dt: f64,
    pub real_dt: f64,
    pub frame_count: u64,
    start: Instant,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl SystemClock {
    pub fn new(target_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        let now = Instant::now();
        Self {
            target_fps,
            max_frame_dt: 0.25,
            real_dt: 0.0,
            frame_count: 0,
            start: now,
            last_instant: now,
            fps_samples: [1.0 / target_fps as f64; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: target_fps as f64,
            smoothed_frame_time_ms: 1000.0 / target_fps as f64,
        }
    }

    fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps as f64)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(60)
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn tick(&mut self) -> f32 {
        let budget = self.frame_budget();
        let since_last = self.last_instant.elapsed();
        if since_last < budget {
            std::thread::sleep(budget - since_last);
        }

        let now = Instant::now();
        self.real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;

        // A stalled frame (debugger, window drag) must not teleport entities.
        if self.real_dt > self.max_frame_dt {
            log::warn!(
                "Frame took {:.1}ms; capping delta to {}ms",
                self.real_dt * 1000.0,
                self.max_frame_dt * 1000.0
            );
            self.real_dt = self.max_frame_dt;
        }
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };

        self.real_dt as f32
    }
}

/// Deterministic clock: every `tick` advances time by exactly `step_ms`.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ms: u64,
    pub step_ms: u64,
}

impl ManualClock {
    pub fn new(step_ms: u64) -> Self {
        Self { now_ms: 0, step_ms }
    }

    pub fn starting_at(now_ms: u64, step_ms: u64) -> Self {
        Self { now_ms, step_ms }
    }

    /// Move time forward without producing a frame.
    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn tick(&mut self) -> f32 {
        self.now_ms += self.step_ms;
        self.step_ms as f32 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_steps_by_fixed_amount() {
        let mut clock = ManualClock::new(16);
        assert_eq!(clock.now_ms(), 0);
        let dt = clock.tick();
        assert!((dt - 0.016).abs() < f32::EPSILON);
        assert_eq!(clock.now_ms(), 16);
        clock.tick();
        assert_eq!(clock.now_ms(), 32);
    }

    #[test]
    fn manual_clock_advance_does_not_count_as_frame() {
        let mut clock = ManualClock::starting_at(1_000, 10);
        clock.advance(250);
        assert_eq!(clock.now_ms(), 1_250);
        clock.tick();
        assert_eq!(clock.now_ms(), 1_260);
    }

    #[test]
    fn system_clock_paces_to_target_rate() {
        let mut clock = SystemClock::new(60);
        let dt = clock.tick();
        // Sleep granularity varies by platform; the frame can only run long.
        assert!(dt >= 1.0 / 60.0 - 0.002, "dt {dt} shorter than frame budget");
        assert!(dt as f64 <= clock.max_frame_dt + f64::EPSILON);
        assert_eq!(clock.frame_count, 1);
    }

    #[test]
    fn smoothed_rate_tracks_real_frame_time() {
        let mut clock = SystemClock::new(60);
        for _ in 0..3 {
            clock.tick();
        }
        assert_eq!(clock.frame_count, 3);
        // Frames never run short of budget, so the average cannot beat the target.
        assert!(clock.smoothed_fps <= 61.0, "fps {}", clock.smoothed_fps);
        assert!((clock.smoothed_fps * clock.smoothed_frame_time_ms - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let mut clock = SystemClock::new(120);
        let before = clock.now_ms();
        clock.tick();
        assert!(clock.now_ms() >= before);
    }
}
