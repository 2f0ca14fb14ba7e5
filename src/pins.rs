//! GPIO / peripheral pin assignments for the cabin controller board.
//!
//! Single source of truth: every driver and task references this module
//! rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Door servo (MCPWM group 0)
// ---------------------------------------------------------------------------

/// MCPWM generator output driving the door servo signal line.
pub const DOOR_SERVO_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// Door audio player (DFPlayer Mini, UART1)
// ---------------------------------------------------------------------------

pub const DOOR_PLAYER_UART: i32 = 1;
pub const DOOR_PLAYER_TX_GPIO: i32 = 17;
pub const DOOR_PLAYER_RX_GPIO: i32 = 18;
/// Digital input: LOW while the player is idle.
pub const DOOR_PLAYER_BUSY_GPIO: i32 = 42;

// ---------------------------------------------------------------------------
// Bake audio player (JQ6500, UART2)
// ---------------------------------------------------------------------------

pub const BAKE_PLAYER_UART: i32 = 2;
pub const BAKE_PLAYER_TX_GPIO: i32 = 13;
pub const BAKE_PLAYER_RX_GPIO: i32 = 15;
/// Digital input: LOW while the player is idle.
pub const BAKE_PLAYER_BUSY_GPIO: i32 = 39;

/// Both players talk 9600 8N1.
pub const PLAYER_BAUD_RATE: u32 = 9_600;

// ---------------------------------------------------------------------------
// Bake lamp (WS2812 strip on RMT)
// ---------------------------------------------------------------------------

pub const LED_STRIP_GPIO: i32 = 40;
/// Pixels physically fitted on the strip.
pub const LED_STRIP_LEN: usize = 16;
