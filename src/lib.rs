//! Cabin installation firmware library.
//!
//! Exposes the service framework, the servo driver and the orchestration
//! tasks for integration testing. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod service;

mod esp_link_shims;

pub use error::{Error, Result};
