/// Frame timing for the character simulation
///
/// Fixed timestep accumulator: every character ticks with the same step
/// length no matter how fast frames arrive, and rendering reads the result
/// once per frame after all steps ran.
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default simulation rate (ticks per second)
pub const DEFAULT_TICK_RATE: f32 = 60.0;

/// Maximum number of steps per frame, so a stall does not snowball
pub const MAX_STEPS_PER_FRAME: u32 = 5;

/// FPS tracking window (average over last N frames)
const FPS_WINDOW_SIZE: usize = 60;

/// Game loop timing state
#[derive(Debug)]
pub struct GameLoop {
    step: Duration,
    accumulator: Duration,
    last_frame_time: Instant,
    start_time: Instant,
    paused: bool,

    /// Frame timing history for FPS calculation
    frame_times: VecDeque<Duration>,
    frame_count: u64,
    tick_count: u64,
    current_fps: f32,
}

impl GameLoop {
    /// Game loop at the default 60 Hz
    pub fn new() -> Self {
        Self::with_tick_rate(DEFAULT_TICK_RATE)
    }

    /// Game loop stepping `tick_rate` times per second.
    ///
    /// Non-positive rates fall back to the default.
    pub fn with_tick_rate(tick_rate: f32) -> Self {
        let rate = if tick_rate > 0.0 {
            tick_rate
        } else {
            log::warn!("Invalid tick rate {}, using {}", tick_rate, DEFAULT_TICK_RATE);
            DEFAULT_TICK_RATE
        };
        let now = Instant::now();
        Self {
            step: Duration::from_secs_f32(1.0 / rate),
            accumulator: Duration::ZERO,
            last_frame_time: now,
            start_time: now,
            paused: false,
            frame_times: VecDeque::with_capacity(FPS_WINDOW_SIZE),
            frame_count: 0,
            tick_count: 0,
            current_fps: 0.0,
        }
    }

    /// Begin a new frame, returns the number of ticks to run
    pub fn begin_frame(&mut self) -> u32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.advance(frame_time)
    }

    /// Account for `frame_time` of wall time and return the ticks due
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.frame_count += 1;

        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > FPS_WINDOW_SIZE {
            self.frame_times.pop_front();
        }
        if self.frame_count % 10 == 0 {
            self.update_fps();
        }

        if self.paused {
            return 0;
        }

        self.accumulator += frame_time;
        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < MAX_STEPS_PER_FRAME {
            self.accumulator -= self.step;
            ticks += 1;
        }
        if ticks == MAX_STEPS_PER_FRAME && self.accumulator >= self.step {
            log::debug!("Dropping {:?} of backlog", self.accumulator);
            self.accumulator = Duration::ZERO;
        }

        self.tick_count += ticks as u64;
        ticks
    }

    /// Length of one tick in seconds
    pub fn tick_duration(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Fraction of a tick left over in the accumulator
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.step.as_secs_f32()
    }

    pub fn fps(&self) -> f32 {
        self.current_fps
    }

    /// Total elapsed time since start
    pub fn elapsed(&self) -> Duration {
        Instant::now().duration_since(self.start_time)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Total ticks executed
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Simulation paused");
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // No burst of ticks for the paused time
            self.accumulator = Duration::ZERO;
            log::info!("Simulation resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    fn update_fps(&mut self) {
        let total: Duration = self.frame_times.iter().sum();
        let avg = total.as_secs_f32() / self.frame_times.len().max(1) as f32;
        self.current_fps = if avg > 0.0 { 1.0 / avg } else { 0.0 };
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}
