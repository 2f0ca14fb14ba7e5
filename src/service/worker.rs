//! Dedicated worker task draining one [`CommandChannel`].
//!
//! A worker is a thread (a FreeRTOS task on ESP-IDF) that owns the only
//! consuming end of its channel and runs a handler for every message,
//! strictly in arrival order. Whatever state the handler captures by move
//! is private to the worker thread; producers share only the channel.

use core::time::Duration;
use std::sync::Arc;
use std::thread::JoinHandle;

use log::debug;

use super::channel::CommandChannel;
use crate::drivers::task_pin::{self, Core};
use crate::error::ChannelError;

/// Where and how a worker thread runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerOptions {
    /// Thread / task name. Must be null-terminated (e.g. `"servo-bus\0"`).
    pub name: &'static str,
    pub core: Core,
    pub priority: u8,
    pub stack_kb: usize,
}

impl WorkerOptions {
    /// Name without the trailing NUL, for logs and errors.
    pub fn display_name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }
}

/// Handle to a running worker: the producer side of its channel.
pub struct Worker<T, const N: usize> {
    channel: Arc<CommandChannel<T, N>>,
    name: &'static str,
    _thread: JoinHandle<()>,
}

impl<T: Send + 'static, const N: usize> Worker<T, N> {
    /// Spawn the worker thread and start draining messages into `handler`.
    ///
    /// The thread runs for the process lifetime.
    pub fn spawn(
        options: WorkerOptions,
        mut handler: impl FnMut(T) + Send + 'static,
    ) -> std::io::Result<Self> {
        let channel: Arc<CommandChannel<T, N>> = Arc::new(CommandChannel::new());
        let rx = Arc::clone(&channel);
        let name = options.display_name();

        let thread = task_pin::spawn_on_core(
            options.core,
            options.priority,
            options.stack_kb,
            options.name,
            move || {
                debug!("worker '{}' draining (depth={})", name, N);
                loop {
                    let msg = rx.receive();
                    handler(msg);
                }
            },
        )?;

        Ok(Self {
            channel,
            name,
            _thread: thread,
        })
    }

    /// Queue `msg` for the worker, waiting at most `timeout` for space.
    pub fn post(&self, msg: T, timeout: Duration) -> Result<(), ChannelError> {
        self.channel.send(msg, timeout)
    }

    /// Messages accepted but not yet picked up by the worker.
    pub fn pending(&self) -> usize {
        self.channel.len()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
