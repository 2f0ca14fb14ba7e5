//! ESP32 system adapter.
//!
//! Heap statistics and the hardware random number generator.
//!
//! - **`target_os = "espidf"`**: `heap_caps_*` and `esp_random()` from
//!   ESP-IDF. With the radio off `esp_random` falls back to the SAR ADC
//!   noise source, which is plenty for lamp flicker and door pauses.
//! - **`not(target_os = "espidf")`**: a xorshift generator and no heap
//!   statistics, for host-side simulation.

use crate::app::ports::Entropy;

/// Free and total bytes of the default heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapUsage {
    pub free: usize,
    pub total: usize,
}

/// Default-capability heap usage. `None` off-target.
#[cfg(target_os = "espidf")]
pub fn heap_usage() -> Option<HeapUsage> {
    use esp_idf_svc::sys::{heap_caps_get_free_size, heap_caps_get_total_size, MALLOC_CAP_DEFAULT};
    // SAFETY: read-only queries on the IDF heap bookkeeping.
    let (free, total) = unsafe {
        (
            heap_caps_get_free_size(MALLOC_CAP_DEFAULT),
            heap_caps_get_total_size(MALLOC_CAP_DEFAULT),
        )
    };
    Some(HeapUsage { free, total })
}

/// Default-capability heap usage. `None` off-target.
#[cfg(not(target_os = "espidf"))]
pub fn heap_usage() -> Option<HeapUsage> {
    None
}

/// Hardware RNG.
#[derive(Debug, Clone)]
pub struct Esp32Rng {
    #[cfg(not(target_os = "espidf"))]
    state: u32,
}

impl Default for Esp32Rng {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32Rng {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            state: 0x2545_F491,
        }
    }
}

#[cfg(target_os = "espidf")]
impl Entropy for Esp32Rng {
    fn next_u32(&mut self) -> u32 {
        // SAFETY: esp_random has no preconditions.
        unsafe { esp_idf_svc::sys::esp_random() }
    }
}

#[cfg(not(target_os = "espidf"))]
impl Entropy for Esp32Rng {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}
