//! Task-level blocking delay.
//!
//! Suspends only the calling task: on ESP-IDF millisecond delays go
//! through `vTaskDelay` (via `esp_idf_hal::delay::FreeRtos`), elsewhere
//! through `std::thread::sleep`.

use core::time::Duration;

use embedded_hal::delay::DelayNs;

/// [`DelayNs`] that yields the CPU to other tasks while waiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskDelay;

impl DelayNs for TaskDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
