//! Process-wide service registry.
//!
//! Owns exactly one instance of every [`Service`] type. Instances are
//! created on demand by [`Registry::create`], set up in place, and then
//! leaked to `'static`: the firmware never tears services down, so every
//! reference handed out stays valid for the process lifetime.
//!
//! Policy: creating the same type twice is a programming error and fails
//! with [`RegistryError::AlreadyCreated`] before anything is constructed.
//! The registry does not order start-up; callers create services in
//! dependency order.

use core::any::{Any, TypeId};
use std::sync::{Mutex, MutexGuard, PoisonError};

use heapless::Vec;
use log::{error, info};

use super::Service;
use crate::error::RegistryError;

/// Upper bound on distinct service types.
pub const MAX_SERVICES: usize = 8;

struct Slot {
    id: TypeId,
    /// `None` while the service is being built and set up.
    service: Option<&'static (dyn Any + Send + Sync)>,
}

/// Type-indexed container of singleton services.
pub struct Registry {
    slots: Mutex<Vec<Slot, MAX_SERVICES>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
        }
    }

    /// Build, set up and register the single instance of `S`.
    ///
    /// The slot is reserved before `S::build` runs, so concurrent or
    /// re-entrant attempts for the same type fail instead of acquiring
    /// hardware twice. `build` may look up services created earlier.
    pub fn create<S: Service>(&self, options: S::Options) -> Result<&'static S, RegistryError> {
        let id = TypeId::of::<S>();
        self.reserve(id, S::NAME)?;

        let built = S::build(self, options).and_then(|mut service| {
            service.setup()?;
            Ok(service)
        });

        match built {
            Ok(service) => {
                let service: &'static S = Box::leak(Box::new(service));
                self.publish(id, service);
                info!("registry: {} ready", S::NAME);
                Ok(service)
            }
            Err(cause) => {
                self.release(id);
                error!("registry: {} setup failed: {}", S::NAME, cause);
                Err(RegistryError::Setup {
                    service: S::NAME,
                    cause,
                })
            }
        }
    }

    /// Look up the instance of `S`; fails if it was never (fully) created.
    pub fn get<S: Service>(&self) -> Result<&'static S, RegistryError> {
        let id = TypeId::of::<S>();
        let found = self
            .table()
            .iter()
            .find(|slot| slot.id == id)
            .and_then(|slot| slot.service);
        found
            .and_then(|service| service.downcast_ref::<S>())
            .ok_or(RegistryError::NotCreated(S::NAME))
    }

    pub fn contains<S: Service>(&self) -> bool {
        self.get::<S>().is_ok()
    }

    /// Number of ready services.
    pub fn len(&self) -> usize {
        self.table().iter().filter(|slot| slot.service.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Internal ──────────────────────────────────────────────

    fn table(&self) -> MutexGuard<'_, Vec<Slot, MAX_SERVICES>> {
        // No code panics while holding the lock; a poisoned table is still consistent.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reserve(&self, id: TypeId, name: &'static str) -> Result<(), RegistryError> {
        let mut table = self.table();
        if table.iter().any(|slot| slot.id == id) {
            return Err(RegistryError::AlreadyCreated(name));
        }
        table
            .push(Slot { id, service: None })
            .map_err(|_| RegistryError::Full)
    }

    fn publish(&self, id: TypeId, service: &'static (dyn Any + Send + Sync)) {
        if let Some(slot) = self.table().iter_mut().find(|slot| slot.id == id) {
            slot.service = Some(service);
        }
    }

    fn release(&self, id: TypeId) {
        self.table().retain(|slot| slot.id != id);
    }
}
