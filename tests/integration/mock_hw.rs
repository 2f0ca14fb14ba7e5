//! Mock hardware for integration tests.
//!
//! Records every pulse write, audio command, strip update and delay so
//! tests can assert on the full command history without touching real
//! MCPWM/UART/RMT registers.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cabin::app::ports::{AngleSink, AudioPlayer, Entropy, LedStrip, Rgb};
use cabin::config::ServoTiming;
use cabin::drivers::mcpwm::PulseOutput;
use cabin::error::{PwmError, RequestError};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin};

// ── Pulse output ──────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct PulseLog {
    pub acquired: Vec<(i32, u32)>,
    pub writes: Vec<(u32, Instant)>,
    pub fail_acquire: bool,
    pub fail_writes: usize,
}

#[allow(dead_code)]
impl PulseLog {
    pub fn pulses(&self) -> Vec<u32> {
        self.writes.iter().map(|(p, _)| *p).collect()
    }
}

/// `PulseOutput` that shares its history with the test through an `Arc`.
#[derive(Clone, Default)]
pub struct RecordingOutput {
    pub log: Arc<Mutex<PulseLog>>,
}

#[allow(dead_code)]
impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_acquire() -> Self {
        let out = Self::new();
        out.log.lock().unwrap().fail_acquire = true;
        out
    }

    pub fn pulses(&self) -> Vec<u32> {
        self.log.lock().unwrap().pulses()
    }

    pub fn acquire_count(&self) -> usize {
        self.log.lock().unwrap().acquired.len()
    }

    /// Poll until `n` writes were recorded or `deadline` passes.
    pub fn wait_for_writes(&self, n: usize, deadline: Duration) -> Vec<u32> {
        let until = Instant::now() + deadline;
        loop {
            let pulses = self.pulses();
            if pulses.len() >= n || Instant::now() >= until {
                return pulses;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

impl PulseOutput for RecordingOutput {
    fn acquire(&mut self, gpio: i32, _timing: &ServoTiming, initial_us: u32) -> Result<(), PwmError> {
        let mut log = self.log.lock().unwrap();
        if log.fail_acquire {
            return Err(PwmError::TimerAlloc(-1));
        }
        log.acquired.push((gpio, initial_us));
        Ok(())
    }

    fn set_pulse_width_us(&mut self, pulse_us: u32) -> Result<(), PwmError> {
        let mut log = self.log.lock().unwrap();
        if log.fail_writes > 0 {
            log.fail_writes -= 1;
            return Err(PwmError::SetCompare(0x103));
        }
        log.writes.push((pulse_us, Instant::now()));
        Ok(())
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Records requested delays without sleeping.
#[derive(Default)]
pub struct RecordingDelay {
    pub ms: Vec<u32>,
}

#[allow(dead_code)]
impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.ms.iter().map(|&m| u64::from(m)).sum()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.ms.push(ms);
    }
}

/// No-op delay that is `Send`, for the servo worker.
#[derive(Default, Clone, Copy)]
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

// ── Angle sink ────────────────────────────────────────────────

/// Records requested angles; rejects the ones listed in `reject`.
#[derive(Default)]
pub struct MockDoor {
    pub requests: RefCell<Vec<i32>>,
    pub reject: Vec<i32>,
}

impl AngleSink for MockDoor {
    fn request_angle(&self, angle: i32) -> Result<(), RequestError> {
        self.requests.borrow_mut().push(angle);
        if self.reject.contains(&angle) {
            Err(RequestError::Timeout)
        } else {
            Ok(())
        }
    }
}

// ── Audio ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCall {
    Volume(u8),
    Play(u16),
}

#[derive(Default)]
pub struct MockPlayer {
    pub calls: Vec<AudioCall>,
}

impl AudioPlayer for MockPlayer {
    fn set_volume(&mut self, volume: u8) {
        self.calls.push(AudioCall::Volume(volume));
    }

    fn play(&mut self, track: u16) {
        self.calls.push(AudioCall::Play(track));
    }
}

// ── Light strip ───────────────────────────────────────────────

pub struct MockStrip {
    pub pixels: Vec<Rgb>,
    pub set_calls: usize,
    pub refreshes: usize,
}

impl MockStrip {
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![(0, 0, 0); len],
            set_calls: 0,
            refreshes: 0,
        }
    }
}

impl LedStrip for MockStrip {
    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set_colour(&mut self, from: usize, to: usize, colour: Rgb) {
        self.set_calls += 1;
        for px in self.pixels.iter_mut().take(to + 1).skip(from) {
            *px = colour;
        }
    }

    fn refresh(&mut self) {
        self.refreshes += 1;
    }
}

// ── Entropy ───────────────────────────────────────────────────

/// Always yields the same sample.
pub struct FixedEntropy(pub u32);

impl Entropy for FixedEntropy {
    fn next_u32(&mut self) -> u32 {
        self.0
    }
}

// ── Busy line ─────────────────────────────────────────────────

#[derive(Debug)]
pub struct PinFault;

impl embedded_hal::digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Scripted busy line: `Some(true)` = HIGH (playing), `Some(false)` = LOW
/// (idle), `None` = read error. Reads HIGH once the script runs out.
pub struct ScriptedBusy {
    pub levels: VecDeque<Option<bool>>,
}

impl ScriptedBusy {
    pub fn new(levels: &[Option<bool>]) -> Self {
        Self {
            levels: levels.iter().copied().collect(),
        }
    }

    fn next(&mut self) -> Result<bool, PinFault> {
        self.levels.pop_front().unwrap_or(Some(true)).ok_or(PinFault)
    }
}

impl ErrorType for ScriptedBusy {
    type Error = PinFault;
}

impl InputPin for ScriptedBusy {
    fn is_high(&mut self) -> Result<bool, PinFault> {
        self.next()
    }

    fn is_low(&mut self) -> Result<bool, PinFault> {
        self.next().map(|high| !high)
    }
}
