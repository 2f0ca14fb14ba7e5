//! Bake lamp: flickering oven glow with a looping crackle track.
//!
//! Each tick re-rolls the brightness of every flicker pixel, pushes the
//! frame, and restarts the track once the player reports idle on its
//! busy line (LOW = not playing).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use log::{debug, info, warn};

use super::ports::{scaled, AudioPlayer, Entropy, LedStrip};
use crate::config::BakeConfig;

pub struct BakeLoop<L, M, B, R, D> {
    strip: L,
    player: M,
    busy: B,
    rng: R,
    delay: D,
    config: BakeConfig,
}

impl<L, M, B, R, D> BakeLoop<L, M, B, R, D>
where
    L: LedStrip,
    M: AudioPlayer,
    B: InputPin,
    R: Entropy,
    D: DelayNs,
{
    pub fn new(strip: L, player: M, busy: B, rng: R, delay: D, config: BakeConfig) -> Self {
        Self {
            strip,
            player,
            busy,
            rng,
            delay,
            config,
        }
    }

    pub fn start(&mut self) {
        info!("bake: volume {} track {}", self.config.volume, self.config.track);
        self.player.set_volume(self.config.volume);
        self.player.play(self.config.track);
    }

    /// One flicker frame plus the idle check. Returns `true` if the track was restarted.
    pub fn tick(&mut self) -> bool {
        let last = self.config.flicker_len.min(self.strip.len());
        for idx in 0..last {
            let r = scaled(self.rng.next_u32(), 256) as u8;
            self.strip.set_colour(idx, idx, (r, r, 0));
        }
        self.strip.refresh();

        let restarted = match self.busy.is_low() {
            Ok(true) => {
                debug!("bake: player idle, restarting track {}", self.config.track);
                self.player.play(self.config.track);
                true
            }
            Ok(false) => false,
            Err(_) => {
                warn!("bake: busy line unreadable");
                false
            }
        };

        self.delay.delay_ms(self.config.tick_ms);
        restarted
    }

    pub fn run(mut self) -> ! {
        self.start();
        loop {
            self.tick();
        }
    }
}
