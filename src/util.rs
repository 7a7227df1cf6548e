//! Frame timing

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Fixed-rate frame clock with a rolling FPS average
pub struct FrameClock {
    frame_times: VecDeque<f32>,
    last_frame: Instant,
    sample_count: usize,
    frame_budget: Duration,
}

impl FrameClock {
    /// Clock targeting `target_fps`, averaging over `sample_count` frames
    pub fn new(target_fps: u32, sample_count: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: Instant::now(),
            sample_count: sample_count.max(1),
            frame_budget: Duration::from_secs_f64(1.0 / target_fps.max(1) as f64),
        }
    }

    pub fn frame_budget(&self) -> Duration {
        self.frame_budget
    }

    /// Call at the start of each frame to record timing
    /// Returns (delta_time, average_fps)
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.record(dt);
        (dt, self.average_fps())
    }

    fn record(&mut self, dt: f32) {
        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }
    }

    pub fn average_fps(&self) -> f32 {
        let avg_dt: f32 =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32;
        if avg_dt > 0.0 {
            1.0 / avg_dt
        } else {
            0.0
        }
    }

    /// Average frame time in milliseconds
    pub fn avg_frame_time_ms(&self) -> f32 {
        let avg_dt: f32 =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32;
        avg_dt * 1000.0
    }

    /// How long to sleep after spending `elapsed` on a frame
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.frame_budget.saturating_sub(elapsed)
    }

    /// Sleep off whatever is left of the current frame's budget
    pub fn wait(&self) {
        let remaining = self.remaining(self.last_frame.elapsed());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_from_target_fps() {
        let clock = FrameClock::new(30, 10);
        let budget = clock.frame_budget().as_secs_f64();
        assert!((budget - 1.0 / 30.0).abs() < 1e-9);
        // Zero fps is treated as 1
        assert_eq!(FrameClock::new(0, 10).frame_budget(), Duration::from_secs(1));
    }

    #[test]
    fn test_remaining_saturates() {
        let clock = FrameClock::new(50, 10);
        assert_eq!(clock.remaining(Duration::from_millis(5)), Duration::from_millis(15));
        assert_eq!(clock.remaining(Duration::from_millis(40)), Duration::ZERO);
    }

    #[test]
    fn test_rolling_average() {
        let mut clock = FrameClock::new(30, 2);
        clock.record(0.5);
        clock.record(0.1);
        clock.record(0.1);
        assert!((clock.average_fps() - 10.0).abs() < 1e-3);
        assert!((clock.avg_frame_time_ms() - 100.0).abs() < 1e-3);
    }
}
