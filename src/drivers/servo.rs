//! Hobby servo actuator service.
//!
//! [`ServoMotor`] owns one MCPWM pulse chain. Callers on any task ask for
//! an angle with [`ServoMotor::request_angle`]; the request is queued and
//! a private worker ("servo-bus") applies it:
//!
//! ```text
//!  request_angle(a) ──▶ queue (8) ──▶ servo-bus worker
//!                                        │ a == last?  ── yes ──▶ drop
//!                                        ▼ no
//!                                   set compare(pulse(a))   (error → log)
//!                                        ▼
//!                                   sleep settle_delay
//!                                        ▼
//!                                   last = a
//! ```
//!
//! The worker is the only context that touches the chain or the
//! last-angle cache.

use core::time::Duration;
use std::sync::{Mutex, PoisonError};

use embedded_hal::delay::DelayNs;
use log::{debug, error, info};

use crate::config::{ServoOptions, ServoTiming};
use crate::drivers::delay::TaskDelay;
use crate::drivers::mcpwm::{McpwmPulseChain, PulseOutput};
use crate::drivers::task_pin::Core;
use crate::error::{PwmError, RequestError, ServiceError};
use crate::service::{Registry, Service, Worker, WorkerOptions};

/// Capacity of the servo command queue.
pub const SERVO_QUEUE_DEPTH: usize = 8;

/// Worker placement for every servo bus.
pub const SERVO_WORKER: WorkerOptions = WorkerOptions {
    name: "servo-bus\0",
    core: Core::App,
    priority: 5,
    stack_kb: 4,
};

/// A move request in transit to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleCommand {
    pub angle: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoState {
    Uninitialized,
    Ready,
}

/// What the worker did with one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Same angle as last time: no write, no delay.
    Unchanged,
    /// Compare value written, settle delay elapsed.
    Moved { angle: i32, pulse_us: u32 },
    /// Write failed; the settle delay still elapsed and the angle is cached.
    Faulted { angle: i32, error: PwmError },
}

// ───────────────────────────────────────────────────────────────
// Worker-side command handler
// ───────────────────────────────────────────────────────────────

/// State private to the servo worker: the chain and the angle cache.
pub struct ServoHandler<P, D> {
    output: P,
    timing: ServoTiming,
    last_angle: i32,
    delay: D,
}

impl<P: PulseOutput, D: DelayNs> ServoHandler<P, D> {
    /// `initial_angle` must be the position the chain was preloaded with.
    pub fn new(output: P, timing: ServoTiming, initial_angle: i32, delay: D) -> Self {
        Self {
            output,
            timing,
            last_angle: initial_angle,
            delay,
        }
    }

    pub fn handle(&mut self, cmd: AngleCommand) -> Applied {
        if cmd.angle == self.last_angle {
            return Applied::Unchanged;
        }

        let pulse_us = self.timing.pulse_width_us(cmd.angle);
        let applied = match self.output.set_pulse_width_us(pulse_us) {
            Ok(()) => {
                debug!("servo: {} deg -> {}us", cmd.angle, pulse_us);
                Applied::Moved {
                    angle: cmd.angle,
                    pulse_us,
                }
            }
            Err(e) => {
                error!("servo: error setting comparator value, {}", e);
                Applied::Faulted {
                    angle: cmd.angle,
                    error: e,
                }
            }
        };

        // Travel time is ~200 ms per 60 degrees at 5 V; wait regardless of distance.
        self.delay.delay_ms(self.timing.settle_delay_ms);
        self.last_angle = cmd.angle;
        applied
    }

    pub fn last_angle(&self) -> i32 {
        self.last_angle
    }
}

// ───────────────────────────────────────────────────────────────
// ServoMotor service
// ───────────────────────────────────────────────────────────────

/// Registry options: configuration plus the not-yet-acquired hardware.
pub struct ServoParts<P, D = TaskDelay> {
    pub options: ServoOptions,
    pub output: P,
    pub delay: D,
}

impl ServoParts<McpwmPulseChain, TaskDelay> {
    /// MCPWM output with task delays.
    pub fn mcpwm(options: ServoOptions) -> Self {
        Self {
            options,
            output: McpwmPulseChain::new(),
            delay: TaskDelay,
        }
    }
}

/// One servo, its queue, and its worker.
pub struct ServoMotor<P = McpwmPulseChain, D = TaskDelay> {
    options: ServoOptions,
    state: ServoState,
    /// Hardware waiting for `setup()`; only ever reached through `get_mut`.
    pending: Mutex<Option<(P, D)>>,
    bus: Option<Worker<AngleCommand, SERVO_QUEUE_DEPTH>>,
}

impl<P, D> ServoMotor<P, D>
where
    P: PulseOutput,
    D: DelayNs + Send + 'static,
{
    pub fn new(options: ServoOptions, output: P, delay: D) -> Self {
        Self {
            options,
            state: ServoState::Uninitialized,
            pending: Mutex::new(Some((output, delay))),
            bus: None,
        }
    }

    /// Acquire the pulse chain, centre the servo and start the worker.
    ///
    /// Any error here is unrecoverable for this actuator.
    pub fn setup(&mut self) -> Result<(), ServiceError> {
        let (mut output, delay) = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(ServiceError::AlreadySetUp)?;

        let timing = self.options.timing;
        let centre = timing.centre_degree();
        info!(
            "servo: setup gpio={} range=[{},{}]deg -> [{},{}]us",
            self.options.gpio, timing.min_degree, timing.max_degree, timing.min_pulse_us, timing.max_pulse_us
        );
        output.acquire(self.options.gpio, &timing, timing.pulse_width_us(centre))?;

        let mut handler = ServoHandler::new(output, timing, centre, delay);
        let bus = Worker::spawn(SERVO_WORKER, move |cmd| {
            handler.handle(cmd);
        })
        .map_err(|e| {
            error!("servo: worker spawn failed: {}", e);
            ServiceError::WorkerSpawn(SERVO_WORKER.display_name())
        })?;

        self.bus = Some(bus);
        self.state = ServoState::Ready;
        Ok(())
    }

    /// Queue a move to `angle`. No range check here; the pulse mapping clamps.
    ///
    /// Waits up to `request_timeout_ms` for queue space; on timeout the
    /// request is dropped and the caller decides what to do.
    pub fn request_angle(&self, angle: i32) -> Result<(), RequestError> {
        let bus = self.bus.as_ref().ok_or(RequestError::NotReady)?;
        let timeout = Duration::from_millis(u64::from(self.options.request_timeout_ms));
        bus.post(AngleCommand { angle }, timeout).map_err(|e| {
            debug!("servo: angle {} dropped: {}", angle, e);
            RequestError::from(e)
        })
    }

    pub fn state(&self) -> ServoState {
        self.state
    }

    pub fn options(&self) -> &ServoOptions {
        &self.options
    }

    /// Requests accepted but not yet picked up by the worker.
    pub fn pending_requests(&self) -> usize {
        self.bus.as_ref().map_or(0, Worker::pending)
    }
}

impl<P, D> Service for ServoMotor<P, D>
where
    P: PulseOutput,
    D: DelayNs + Send + 'static,
{
    type Options = ServoParts<P, D>;
    const NAME: &'static str = "ServoMotor";

    fn build(_registry: &Registry, parts: ServoParts<P, D>) -> Result<Self, ServiceError> {
        Ok(Self::new(parts.options, parts.output, parts.delay))
    }

    fn setup(&mut self) -> Result<(), ServiceError> {
        ServoMotor::setup(self)
    }
}
