//! Adapters: concrete implementations of the task port traits.
//!
//! | Adapter     | Implements   | Connects to                      |
//! |-------------|--------------|----------------------------------|
//! | `audio`     | AudioPlayer  | DFPlayer / JQ6500 (UART1/UART2)  |
//! | `hardware`  | AngleSink    | `ServoMotor` service             |
//! | `led_strip` | LedStrip     | WS2812 frame buffer (GPIO 40)    |
//! | `system`    | Entropy      | `esp_random`, heap statistics    |

pub mod audio;
pub mod hardware;
pub mod led_strip;
pub mod system;
