//! Cabin firmware: main entry point.
//!
//! Composition root. Brings the registry and the services up in
//! dependency order, then hands the hardware to the orchestration tasks.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  LogAudioPlayer x2   FrameLedStrip   Esp32Rng   busy GPIO39  │
//! │                                                              │
//! │  Registry ──▶ ServoMotor (servo-bus worker, MCPWM gpio16)    │
//! │                                                              │
//! │  ───────────────── Port Trait Boundary ─────────────────     │
//! │                                                              │
//! │  bake-task: BakeLoop            door-task: DoorCycle         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use log::{error, info};

use cabin::adapters::audio::{LogAudioPlayer, PlayerWiring};
use cabin::adapters::led_strip::FrameLedStrip;
use cabin::adapters::system::{heap_usage, Esp32Rng};
use cabin::app::ports::{LedStrip, COLOUR_YELLOW};
use cabin::app::{BakeLoop, DoorCycle};
use cabin::config::CabinConfig;
use cabin::drivers::delay::TaskDelay;
use cabin::drivers::servo::{ServoMotor, ServoParts};
use cabin::drivers::task_pin::{spawn_on_core, Core};
use cabin::pins;
use cabin::service::Registry;

/// Orchestration tasks run below the servo worker so queued moves drain promptly.
const TASK_PRIORITY: u8 = 4;

static REGISTRY: Registry = Registry::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("cabin v{}", env!("CARGO_PKG_VERSION"));
    if let Some(heap) = heap_usage() {
        info!("heap: {}/{}", heap.free, heap.total);
    }

    if let Err(e) = run() {
        // No degraded mode: a cabin without its door or lamp is not worth running.
        error!("startup failed: {:#} - halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 5. Park main; the tasks own the device from here ──────
    loop {
        std::thread::park();
    }
}

fn run() -> Result<()> {
    let config = CabinConfig::default();
    let peripherals = Peripherals::take()?;

    // ── 2. Audio players ──────────────────────────────────────
    let door_player = LogAudioPlayer::new("door-player", PlayerWiring::DOOR);
    let bake_player = LogAudioPlayer::new("bake-player", PlayerWiring::BAKE);
    let bake_busy = PinDriver::input(peripherals.pins.gpio39)?;

    // ── 3. Services, in dependency order ──────────────────────
    let door: &'static ServoMotor = REGISTRY.create::<ServoMotor>(ServoParts::mcpwm(config.door_servo))?;

    let mut lamp = FrameLedStrip::new(pins::LED_STRIP_GPIO, pins::LED_STRIP_LEN);
    lamp.set_colour(0, pins::LED_STRIP_LEN - 1, COLOUR_YELLOW);
    lamp.refresh();

    // ── 4. Orchestration tasks ────────────────────────────────
    let bake = BakeLoop::new(lamp, bake_player, bake_busy, Esp32Rng::new(), TaskDelay, config.bake);
    spawn_on_core(Core::App, TASK_PRIORITY, config.task_stack_kb, "bake-task\0", move || bake.run())?;

    let door_cycle = DoorCycle::new(door, door_player, Esp32Rng::new(), TaskDelay, config.door);
    spawn_on_core(Core::App, TASK_PRIORITY, config.task_stack_kb, "door-task\0", move || {
        door_cycle.run()
    })?;

    info!("cabin: {} services, tasks running", REGISTRY.len());
    Ok(())
}
