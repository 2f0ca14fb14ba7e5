//! Port traits: the boundary between the orchestration tasks and hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DoorCycle / BakeLoop
//! ```
//!
//! Driven adapters (servo service, light strip, audio players, RNG)
//! implement these traits. The tasks consume them via generics, so the
//! choreography is testable without real peripherals. Pacing and the
//! player busy line use the `embedded-hal` traits directly.

use crate::error::RequestError;

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

/// Warm lamp colour used for the idle glow.
pub const COLOUR_YELLOW: Rgb = (255, 255, 0);

// ───────────────────────────────────────────────────────────────
// Actuator port (task → servo service)
// ───────────────────────────────────────────────────────────────

/// Something that accepts move requests by angle.
pub trait AngleSink {
    /// Ask for `angle` degrees. `Err` means the request was dropped.
    fn request_angle(&self, angle: i32) -> Result<(), RequestError>;
}

impl<T: AngleSink + ?Sized> AngleSink for &T {
    fn request_angle(&self, angle: i32) -> Result<(), RequestError> {
        (**self).request_angle(angle)
    }
}

// ───────────────────────────────────────────────────────────────
// Light strip port
// ───────────────────────────────────────────────────────────────

/// Addressable strip with a frame buffer: writes are staged until `refresh`.
pub trait LedStrip {
    /// Number of pixels.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stage `colour` for pixels `from..=to`. Out-of-range indices are ignored.
    fn set_colour(&mut self, from: usize, to: usize, colour: Rgb);

    /// Push the staged frame to the strip.
    fn refresh(&mut self);
}

impl<T: LedStrip + ?Sized> LedStrip for &mut T {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn set_colour(&mut self, from: usize, to: usize, colour: Rgb) {
        (**self).set_colour(from, to, colour);
    }

    fn refresh(&mut self) {
        (**self).refresh();
    }
}

// ───────────────────────────────────────────────────────────────
// Audio port
// ───────────────────────────────────────────────────────────────

/// A serial MP3 module (DFPlayer, JQ6500, ...).
pub trait AudioPlayer {
    /// Volume 0–30.
    fn set_volume(&mut self, volume: u8);

    /// Start playing `track` (1-based), interrupting anything playing.
    fn play(&mut self, track: u16);
}

impl<T: AudioPlayer + ?Sized> AudioPlayer for &mut T {
    fn set_volume(&mut self, volume: u8) {
        (**self).set_volume(volume);
    }

    fn play(&mut self, track: u16) {
        (**self).play(track);
    }
}

// ───────────────────────────────────────────────────────────────
// Entropy port
// ───────────────────────────────────────────────────────────────

/// Source of uniformly distributed 32-bit samples.
pub trait Entropy {
    fn next_u32(&mut self) -> u32;
}

impl<T: Entropy + ?Sized> Entropy for &mut T {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }
}

/// Scale a 32-bit sample onto `0..max` without modulo bias.
pub fn scaled(sample: u32, max: u32) -> u32 {
    ((u64::from(max) * u64::from(sample)) >> 32) as u32
}
