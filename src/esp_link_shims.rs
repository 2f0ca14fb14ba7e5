//! ESP-IDF runtime symbol providers for third-party crates.
//!
//! - `embassy-sync` guards its channel state with `critical-section`; the
//!   two `_critical_section_1_0_*` symbols back it with a process-wide
//!   re-entrant lock. Interrupt handlers never touch the command channels,
//!   so a mutex (rather than masking interrupts) is sufficient.
//! - `async-io-mini` timers (the channel send deadline) run on
//!   `embassy-time`, whose driver is `_embassy_time_now` /
//!   `_embassy_time_schedule_wake` below, backed by `esp_timer`.
//!
//! On the host, `critical-section/std` and `embassy-time/std` provide the
//! same symbols for tests.

#[cfg(target_os = "espidf")]
use core::cell::{Cell, RefCell};
#[cfg(target_os = "espidf")]
use core::time::Duration;
#[cfg(target_os = "espidf")]
use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(target_os = "espidf")]
static SECTION_LOCK: Mutex<()> = Mutex::new(());

#[cfg(target_os = "espidf")]
thread_local! {
    static SECTION_DEPTH: Cell<u8> = const { Cell::new(0) };
    static SECTION_GUARD: RefCell<Option<MutexGuard<'static, ()>>> = const { RefCell::new(None) };
}

/// Enter the critical section; nested entries on the same task only bump the depth.
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_acquire() -> u8 {
    SECTION_DEPTH.with(|depth| {
        let d = depth.get();
        if d == 0 {
            let lock = SECTION_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
            SECTION_GUARD.with(|guard| *guard.borrow_mut() = Some(lock));
        }
        let new_depth = d.saturating_add(1);
        depth.set(new_depth);
        new_depth
    })
}

/// Leave the critical section; the lock is dropped when the outermost entry exits.
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_release(_token: u8) {
    SECTION_DEPTH.with(|depth| {
        let d = depth.get();
        if d == 0 {
            return;
        }
        depth.set(d - 1);
        if d == 1 {
            SECTION_GUARD.with(|guard| *guard.borrow_mut() = None);
        }
    })
}

/// Microseconds since boot; `embassy-time` runs at 1 MHz.
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_now() -> u64 {
    // SAFETY: esp_timer is started by the IDF before app_main.
    unsafe { esp_idf_svc::sys::esp_timer_get_time() as u64 }
}

/// Wake `waker` once `_embassy_time_now()` reaches `at`.
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_schedule_wake(at: u64, waker: *mut core::ffi::c_void) {
    if waker.is_null() {
        return;
    }

    // SAFETY: embassy-time passes a valid `Waker` for the duration of this
    // call; it is cloned before the call returns.
    let waker = unsafe { (*(waker as *const core::task::Waker)).clone() };
    std::thread::spawn(move || {
        let now = _embassy_time_now();
        if at > now {
            std::thread::sleep(Duration::from_micros(at - now));
        }
        waker.wake();
    });
}
