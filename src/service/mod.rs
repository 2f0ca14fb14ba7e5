//! Service framework: peripherals owned by workers, looked up by type.
//!
//! ```text
//!   create::<S>(opts) ──▶ Registry ──▶ S::build ──▶ S::setup ──▶ &'static S
//!                                                      │
//!                                                      ▼
//!   task ── request ──▶ CommandChannel ──▶ Worker (owns the peripheral)
//! ```

pub mod channel;
pub mod registry;
pub mod worker;

pub use channel::CommandChannel;
pub use registry::Registry;
pub use worker::{Worker, WorkerOptions};

use crate::error::ServiceError;

/// A long-lived component owned by the [`Registry`].
pub trait Service: Send + Sync + Sized + 'static {
    /// Construction-time configuration.
    type Options;

    /// Short name used in logs and errors.
    const NAME: &'static str;

    /// Construct the service. Collaborators created earlier may be
    /// fetched from `registry`.
    fn build(registry: &Registry, options: Self::Options) -> Result<Self, ServiceError>;

    /// One-time hardware acquisition. Runs before the service is published.
    fn setup(&mut self) -> Result<(), ServiceError> {
        Ok(())
    }
}
