//! Addressable light strip adapter.
//!
//! Keeps the staged frame in a fixed-capacity buffer and logs each
//! refresh. The RMT waveform encoder for the WS2812 pixels is not part
//! of this firmware; the frame buffer is the hand-off point for it.

use heapless::Vec;
use log::{debug, info};

use crate::app::ports::{LedStrip, Rgb};

/// Longest strip one adapter can drive.
pub const MAX_PIXELS: usize = 64;

pub struct FrameLedStrip {
    gpio: i32,
    frame: Vec<Rgb, MAX_PIXELS>,
    refreshes: u32,
}

impl FrameLedStrip {
    /// A strip of `len` pixels (capped at [`MAX_PIXELS`]), all off.
    pub fn new(gpio: i32, len: usize) -> Self {
        let mut frame = Vec::new();
        // Cannot fail: bounded by capacity.
        let _ = frame.resize(len.min(MAX_PIXELS), (0, 0, 0));
        info!("led strip: gpio={} pixels={}", gpio, frame.len());
        Self {
            gpio,
            frame,
            refreshes: 0,
        }
    }

    pub fn pixel(&self, idx: usize) -> Option<Rgb> {
        self.frame.get(idx).copied()
    }

    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }
}

impl LedStrip for FrameLedStrip {
    fn len(&self) -> usize {
        self.frame.len()
    }

    fn set_colour(&mut self, from: usize, to: usize, colour: Rgb) {
        if from > to {
            return;
        }
        let end = to.saturating_add(1).min(self.frame.len());
        if let Some(pixels) = self.frame.get_mut(from..end) {
            pixels.fill(colour);
        }
    }

    fn refresh(&mut self) {
        self.refreshes = self.refreshes.wrapping_add(1);
        debug!(
            "led strip: gpio={} frame #{} first={:?}",
            self.gpio,
            self.refreshes,
            self.frame.first()
        );
    }
}
