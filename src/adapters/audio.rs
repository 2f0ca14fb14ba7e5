//! Serial MP3 player adapter.
//!
//! Records and logs the commands for one player module (door: DFPlayer on
//! UART1, bake: JQ6500 on UART2). The UART framing of either module is
//! outside this firmware; this adapter is the seam where it plugs in.

use log::info;

use crate::app::ports::AudioPlayer;
use crate::pins;

/// Highest volume step both modules accept.
pub const MAX_VOLUME: u8 = 30;

/// UART wiring of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerWiring {
    pub uart: i32,
    pub tx_gpio: i32,
    pub rx_gpio: i32,
    pub busy_gpio: i32,
    pub baud_rate: u32,
}

impl PlayerWiring {
    /// DFPlayer Mini behind the door.
    pub const DOOR: Self = Self {
        uart: pins::DOOR_PLAYER_UART,
        tx_gpio: pins::DOOR_PLAYER_TX_GPIO,
        rx_gpio: pins::DOOR_PLAYER_RX_GPIO,
        busy_gpio: pins::DOOR_PLAYER_BUSY_GPIO,
        baud_rate: pins::PLAYER_BAUD_RATE,
    };

    /// JQ6500 inside the oven.
    pub const BAKE: Self = Self {
        uart: pins::BAKE_PLAYER_UART,
        tx_gpio: pins::BAKE_PLAYER_TX_GPIO,
        rx_gpio: pins::BAKE_PLAYER_RX_GPIO,
        busy_gpio: pins::BAKE_PLAYER_BUSY_GPIO,
        baud_rate: pins::PLAYER_BAUD_RATE,
    };
}

pub struct LogAudioPlayer {
    name: &'static str,
    wiring: PlayerWiring,
    volume: u8,
    last_track: Option<u16>,
}

impl LogAudioPlayer {
    pub fn new(name: &'static str, wiring: PlayerWiring) -> Self {
        info!(
            "{}: uart{} tx={} rx={} busy={} @{}baud",
            name, wiring.uart, wiring.tx_gpio, wiring.rx_gpio, wiring.busy_gpio, wiring.baud_rate
        );
        Self {
            name,
            wiring,
            volume: MAX_VOLUME,
            last_track: None,
        }
    }

    pub fn wiring(&self) -> &PlayerWiring {
        &self.wiring
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn last_track(&self) -> Option<u16> {
        self.last_track
    }
}

impl AudioPlayer for LogAudioPlayer {
    fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(MAX_VOLUME);
        info!("{}: volume {}", self.name, self.volume);
    }

    fn play(&mut self, track: u16) {
        self.last_track = Some(track);
        info!("{}: play track {}", self.name, track);
    }
}
