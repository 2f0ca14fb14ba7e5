//! Hardware adapter: bridges the servo service to the actuator port.
//!
//! The door task only knows [`AngleSink`]; this is the single place that
//! ties it to the concrete [`ServoMotor`] living in the registry.

use embedded_hal::delay::DelayNs;

use crate::app::ports::AngleSink;
use crate::drivers::mcpwm::PulseOutput;
use crate::drivers::servo::ServoMotor;
use crate::error::RequestError;

impl<P, D> AngleSink for ServoMotor<P, D>
where
    P: PulseOutput,
    D: DelayNs + Send + 'static,
{
    fn request_angle(&self, angle: i32) -> Result<(), RequestError> {
        ServoMotor::request_angle(self, angle)
    }
}
