//! Time sources and FPS tracking

use std::time::Instant;

/// Wall-clock milliseconds as seen by the game
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Milliseconds since the clock was created
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Clock advanced by hand (headless runs, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self { now: start_ms }
    }

    pub fn advance(&mut self, ms: u64) -> u64 {
        self.now += ms;
        self.now
    }

    pub fn set(&mut self, ms: u64) {
        self.now = ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now
    }
}

const FPS_WINDOW: usize = 60;

/// Frames per second over the last 60 frames
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame_times: [u64; FPS_WINDOW],
    frame_index: usize,
    frames_seen: usize,
    fps: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            frame_times: [0; FPS_WINDOW],
            frame_index: 0,
            frames_seen: 0,
            fps: 0,
        }
    }
}

impl FrameClock {
    /// Record a frame drawn at `now_ms` and refresh the FPS estimate
    pub fn record(&mut self, now_ms: u64) -> u32 {
        self.frame_times[self.frame_index] = now_ms;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;
        self.frames_seen = (self.frames_seen + 1).min(FPS_WINDOW);

        if self.frames_seen == FPS_WINDOW {
            // Oldest sample is the slot we'll overwrite next
            let oldest = self.frame_times[self.frame_index];
            let elapsed = now_ms.saturating_sub(oldest);
            if elapsed > 0 {
                self.fps = ((FPS_WINDOW as f64 - 1.0) * 1000.0 / elapsed as f64).round() as u32;
            }
        }
        self.fps
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let mut clock = ManualClock::new(100);
        assert_eq!(clock.now_ms(), 100);
        assert_eq!(clock.advance(16), 116);
        clock.set(5);
        assert_eq!(clock.now_ms(), 5);
    }

    #[test]
    fn test_fps_needs_full_window() {
        let mut fc = FrameClock::default();
        for i in 0..59 {
            assert_eq!(fc.record(i * 16), 0);
        }
    }

    #[test]
    fn test_fps_at_steady_rate() {
        let mut fc = FrameClock::default();
        let mut fps = 0;
        for i in 0..200u64 {
            fps = fc.record(i * 20);
        }
        assert_eq!(fps, 50);
        assert_eq!(fc.fps(), 50);
    }
}
