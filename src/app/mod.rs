//! Cabin behaviours: the long-running orchestration tasks.
//!
//! Tasks only see the hardware through the traits in [`ports`] and the
//! `embedded-hal` delay and input traits, so every loop body runs on the
//! host under test.

pub mod bake;
pub mod door;
pub mod ports;

pub use bake::BakeLoop;
pub use door::DoorCycle;
