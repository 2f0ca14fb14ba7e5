//! Actuator drivers and task helpers.

pub mod delay;
pub mod mcpwm;
pub mod servo;
pub mod task_pin;
