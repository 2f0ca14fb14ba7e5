//! Bounded command channel between producer tasks and one service worker.
//!
//! Wraps an `embassy-sync` channel so that plain FreeRTOS tasks (threads)
//! can use it: `send` blocks up to a deadline, `receive` blocks forever.
//!
//! ```text
//! ┌────────────┐
//! │ door task  │──┐  send(cmd, timeout)  ┌───────────────┐  receive()  ┌──────────┐
//! └────────────┘  ├────────────────────▶│ CommandChannel │───────────▶│  worker  │
//! ┌────────────┐  │                     │   (FIFO, N)    │            │ (single) │
//! │ other task │──┘                     └───────────────┘            └──────────┘
//! ```
//!
//! Insertion is serialised by the channel's critical section, so the
//! consumer sees commands in the order their `send` calls succeeded.
//! Only one blocked producer at a time waits on the embassy channel; the
//! others sleep on a condition variable until it is their turn or their
//! deadline passes.

use core::time::Duration;
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Instant;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use futures_lite::future;

use crate::error::ChannelError;

/// Longer send timeouts are clamped to this.
const MAX_SEND_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

/// Fixed-capacity MPSC FIFO of `T`.
pub struct CommandChannel<T, const N: usize> {
    inner: Channel<CriticalSectionRawMutex, T, N>,
    /// `true` while one producer is parked on `inner`. The embassy channel
    /// keeps a single sender waker, so further blocked producers wait on
    /// `gate_free` instead of fighting over it.
    gate: Mutex<bool>,
    gate_free: Condvar,
}

/// Held by the one producer allowed to wait on the embassy channel.
struct SendGate<'a> {
    gate: &'a Mutex<bool>,
    gate_free: &'a Condvar,
}

impl Drop for SendGate<'_> {
    fn drop(&mut self) {
        *self.gate.lock().unwrap_or_else(PoisonError::into_inner) = false;
        self.gate_free.notify_one();
    }
}

impl<T, const N: usize> Default for CommandChannel<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> CommandChannel<T, N> {
    pub const fn new() -> Self {
        Self {
            inner: Channel::new(),
            gate: Mutex::new(false),
            gate_free: Condvar::new(),
        }
    }

    /// Enqueue `msg`, waiting at most `timeout` for free capacity.
    ///
    /// On timeout the message is dropped and never becomes visible to the
    /// consumer. A zero timeout only tries once.
    pub fn send(&self, msg: T, timeout: Duration) -> Result<(), ChannelError> {
        let msg = match self.inner.try_send(msg) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Full(msg)) => msg,
        };
        if timeout.is_zero() {
            return Err(ChannelError::Timeout);
        }

        let deadline = Instant::now() + timeout.min(MAX_SEND_WAIT);
        let _gate = self.enter_gate(deadline).ok_or(ChannelError::Timeout)?;
        let remaining = deadline.saturating_duration_since(Instant::now());

        // The send future is polled first on every wake, so capacity that
        // frees up at the deadline still wins. Dropping a pending send
        // future discards its message without enqueuing it.
        future::block_on(future::or(
            async {
                self.inner.send(msg).await;
                Ok(())
            },
            async {
                async_io_mini::Timer::after(remaining).await;
                Err(ChannelError::Timeout)
            },
        ))
    }

    /// Wait (sleeping, not polling) until no other producer is blocked on
    /// the channel, or until `deadline`.
    fn enter_gate(&self, deadline: Instant) -> Option<SendGate<'_>> {
        let mut busy = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        while *busy {
            let left = deadline
                .checked_duration_since(Instant::now())
                .filter(|d| !d.is_zero())?;
            busy = self
                .gate_free
                .wait_timeout(busy, left)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *busy = true;
        Some(SendGate {
            gate: &self.gate,
            gate_free: &self.gate_free,
        })
    }

    /// Block the calling context until a message is available.
    pub fn receive(&self) -> T {
        future::block_on(self.inner.receive())
    }

    /// Take the next message without blocking.
    pub fn try_receive(&self) -> Option<T> {
        self.inner.try_receive().ok()
    }

    /// Messages currently queued.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}
