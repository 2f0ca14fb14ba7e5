//! Door cycle: open slowly with a creak, wait, close quickly with a thud.
//!
//! ```text
//!   start ──▶ request(closed)
//!               │
//!   ┌───────────▼────────────────────────────────────────────┐
//!   │ play(open_track)  sweep closed → open  (step 1, 50 ms) │
//!   │ pause 5 000 + rand(0..10 000) ms                       │
//!   │ play(close_track) sweep open → closed  (step 4, 50 ms) │
//!   │ pause 5 000 + rand(0..10 000) ms                       │
//!   └───────────┬────────────────────────────────────────────┘
//!               └── repeat forever
//! ```

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use super::ports::{scaled, AngleSink, AudioPlayer, Entropy};
use crate::config::DoorCycleConfig;

/// Angles visited when moving from `from` towards `to` by `step` degrees.
///
/// `from` is always first. The walk stops before overshooting `to`, so `to`
/// itself is only visited when `(to - from)` is a multiple of `step`.
/// A non-positive step is treated as 1.
pub fn sweep_angles(from: i32, to: i32, step: i32) -> impl Iterator<Item = i32> {
    let step = step.max(1);
    let delta = if to >= from { step } else { -step };
    let count = (to - from).unsigned_abs() / step.unsigned_abs() + 1;
    (0..count).map(move |i| from + delta * i as i32)
}

/// The door task's state: its collaborators and its timing.
pub struct DoorCycle<A, M, R, D> {
    door: A,
    player: M,
    rng: R,
    delay: D,
    config: DoorCycleConfig,
    rejected: u32,
}

impl<A, M, R, D> DoorCycle<A, M, R, D>
where
    A: AngleSink,
    M: AudioPlayer,
    R: Entropy,
    D: DelayNs,
{
    pub fn new(door: A, player: M, rng: R, delay: D, config: DoorCycleConfig) -> Self {
        Self {
            door,
            player,
            rng,
            delay,
            config,
            rejected: 0,
        }
    }

    /// Bring the door to its closed position.
    pub fn start(&mut self) {
        info!("door: closing to {} deg", self.config.closed_angle);
        self.request(self.config.closed_angle);
    }

    /// One full open/pause/close/pause cycle.
    pub fn run_cycle(&mut self) {
        let cfg = self.config;

        self.player.play(cfg.open_track);
        self.sweep(cfg.closed_angle, cfg.open_angle, cfg.open_step);
        self.pause();

        self.player.play(cfg.close_track);
        self.sweep(cfg.open_angle, cfg.closed_angle, cfg.close_step);
        self.pause();
    }

    pub fn run(mut self) -> ! {
        self.start();
        loop {
            self.run_cycle();
        }
    }

    /// Requests the servo service refused (queue full or not ready).
    pub fn rejected(&self) -> u32 {
        self.rejected
    }

    fn sweep(&mut self, from: i32, to: i32, step: i32) {
        for angle in sweep_angles(from, to, step) {
            self.request(angle);
            self.delay.delay_ms(self.config.step_interval_ms);
        }
    }

    fn pause(&mut self) {
        let jitter = scaled(self.rng.next_u32(), self.config.pause_jitter_ms);
        self.delay.delay_ms(self.config.pause_min_ms + jitter);
    }

    fn request(&mut self, angle: i32) {
        if let Err(e) = self.door.request_angle(angle) {
            self.rejected = self.rejected.saturating_add(1);
            warn!("door: move to {} deg rejected: {}", angle, e);
        }
    }
}
