//! System configuration parameters
//!
//! All tunable parameters for the cabin installation. Values are fixed at
//! build time; consult the servo datasheet before changing pulse limits.

use serde::{Deserialize, Serialize};

use crate::pins;

/// Servo pulse geometry and pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoTiming {
    /// Minimum commandable angle (degrees).
    pub min_degree: i32,
    /// Maximum commandable angle (degrees).
    pub max_degree: i32,
    /// Pulse width at `min_degree` (microseconds).
    pub min_pulse_us: u32,
    /// Pulse width at `max_degree` (microseconds).
    pub max_pulse_us: u32,
    /// MCPWM timer tick rate. 1 MHz gives 1 us per tick.
    pub timer_resolution_hz: u32,
    /// Timer period in ticks (20 000 ticks at 1 MHz = 20 ms frame).
    pub timer_period_ticks: u32,
    /// Mechanical travel allowance after every distinct move (milliseconds).
    pub settle_delay_ms: u32,
}

impl Default for ServoTiming {
    fn default() -> Self {
        Self {
            min_degree: -90,
            max_degree: 90,
            min_pulse_us: 500,
            max_pulse_us: 2_500,
            timer_resolution_hz: 1_000_000,
            timer_period_ticks: 20_000,
            // ~200 ms / 60 degrees at 5 V; one step of the door sweep fits in 50 ms.
            settle_delay_ms: 50,
        }
    }
}

impl ServoTiming {
    /// Map an angle onto the compare value (pulse width in microseconds).
    ///
    /// Linear over `[min_degree, max_degree] -> [min_pulse_us, max_pulse_us]`
    /// with truncating integer division. Angles outside the range are
    /// clamped first, so the result always lies within the pulse limits.
    pub fn pulse_width_us(&self, angle: i32) -> u32 {
        let angle = angle.clamp(self.min_degree, self.max_degree);
        let span_deg = i64::from(self.max_degree) - i64::from(self.min_degree);
        if span_deg <= 0 {
            return self.min_pulse_us;
        }
        let span_us = i64::from(self.max_pulse_us) - i64::from(self.min_pulse_us);
        let offset = (i64::from(angle) - i64::from(self.min_degree)) * span_us / span_deg;
        (offset + i64::from(self.min_pulse_us)) as u32
    }

    /// Midpoint of the angle range; the position preloaded during setup.
    pub fn centre_degree(&self) -> i32 {
        (self.min_degree + self.max_degree) / 2
    }
}

/// Construction options for one servo actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoOptions {
    /// GPIO routed to the MCPWM generator.
    pub gpio: i32,
    pub timing: ServoTiming,
    /// How long `request_angle` waits for queue space before giving up.
    pub request_timeout_ms: u32,
}

impl ServoOptions {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            timing: ServoTiming::default(),
            request_timeout_ms: 2_000,
        }
    }
}

/// FreeRTOS tick rate of this build (`CONFIG_FREERTOS_HZ`, ESP-IDF default).
pub const FREERTOS_TICK_HZ: u32 = 100;

/// Fixed door pause, in scheduler ticks.
const DOOR_PAUSE_TICKS: u32 = 500;

/// Door sweep choreography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorCycleConfig {
    /// Resting (shut) angle.
    pub closed_angle: i32,
    /// Fully swung angle.
    pub open_angle: i32,
    /// Degrees per request while opening.
    pub open_step: i32,
    /// Degrees per request while closing.
    pub close_step: i32,
    /// Pause between consecutive sweep requests (milliseconds).
    pub step_interval_ms: u32,
    /// Fixed part of the pause at either end of the sweep.
    ///
    /// The installation waits 500 scheduler ticks here, not 500 ms. With the
    /// stock `CONFIG_FREERTOS_HZ` of [`FREERTOS_TICK_HZ`] that is 5 s.
    pub pause_min_ms: u32,
    /// Upper bound of the random part of the pause.
    pub pause_jitter_ms: u32,
    /// Track played as the door opens.
    pub open_track: u16,
    /// Track played as the door closes.
    pub close_track: u16,
}

impl Default for DoorCycleConfig {
    fn default() -> Self {
        Self {
            closed_angle: 90,
            open_angle: -10,
            open_step: 1,
            close_step: 4,
            step_interval_ms: 50,
            pause_min_ms: DOOR_PAUSE_TICKS * 1_000 / FREERTOS_TICK_HZ,
            pause_jitter_ms: 10_000,
            open_track: 3,
            close_track: 1,
        }
    }
}

/// Bake lamp flicker and crackle loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BakeConfig {
    /// Number of pixels that flicker.
    pub flicker_len: usize,
    /// Loop period (milliseconds).
    pub tick_ms: u32,
    /// Player volume (0-30).
    pub volume: u8,
    /// Looping crackle track.
    pub track: u16,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            flicker_len: pins::LED_STRIP_LEN,
            tick_ms: 50,
            volume: 29,
            track: 1,
        }
    }
}

/// Whole-device configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinConfig {
    pub door_servo: ServoOptions,
    pub door: DoorCycleConfig,
    pub bake: BakeConfig,
    /// Stack for each orchestration task (KB).
    pub task_stack_kb: usize,
}

impl Default for CabinConfig {
    fn default() -> Self {
        Self {
            door_servo: ServoOptions::new(pins::DOOR_SERVO_GPIO),
            door: DoorCycleConfig::default(),
            bake: BakeConfig::default(),
            task_stack_kb: 4,
        }
    }
}
