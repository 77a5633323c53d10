//! Ordered hand-off of work from the game thread to the rendering thread.
//!
//! Commands are sent over a single `mpsc` channel and drained in order by one
//! dedicated thread, so a command always runs after every command enqueued
//! before it. Nothing is dropped or cancelled: a backed-up queue only delays
//! results.

use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle, ThreadId};

use crate::error::{RaymarchError, Result};

/// Consumer of commands on the rendering thread.
pub trait CommandHandler<C> {
    /// Runs one command to completion.
    fn handle(&mut self, command: C);
}

impl<C, F: FnMut(C)> CommandHandler<C> for F {
    fn handle(&mut self, command: C) {
        self(command);
    }
}

/// A dedicated thread draining commands in FIFO order.
///
/// Dropping the queue closes the channel, lets the thread finish every
/// command already enqueued, and joins it.
pub struct RenderQueue<C: Send + 'static> {
    sender: Option<Sender<C>>,
    thread: Option<JoinHandle<()>>,
}

impl<C: Send + 'static> RenderQueue<C> {
    /// Spawns the consumer thread.
    ///
    /// `make_handler` runs on the new thread, so whatever it builds is owned
    /// by that thread from the start.
    pub fn spawn<H, F>(name: &str, make_handler: F) -> Result<Self>
    where
        H: CommandHandler<C>,
        F: FnOnce() -> H + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel::<C>();
        let thread = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut handler = make_handler();
                for command in receiver {
                    handler.handle(command);
                }
                log::debug!("{} drained", thread::current().name().unwrap_or("render queue"));
            })?;

        Ok(Self {
            sender: Some(sender),
            thread: Some(thread),
        })
    }

    /// Enqueues a command. Returns immediately.
    ///
    /// Fails only if the consumer thread has stopped.
    pub fn enqueue(&self, command: C) -> Result<()> {
        self.sender
            .as_ref()
            .ok_or(RaymarchError::RenderThreadUnavailable)?
            .send(command)
            .map_err(|_| RaymarchError::RenderThreadUnavailable)
    }

    /// Id of the consumer thread.
    #[must_use]
    pub fn thread_id(&self) -> Option<ThreadId> {
        self.thread.as_ref().map(|t| t.thread().id())
    }
}

impl<C: Send + 'static> Drop for RenderQueue<C> {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("rendering thread panicked");
            }
        }
    }
}

/// Records the thread that owns a resource and asserts later accesses
/// happen on it.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    owner: ThreadId,
    name: &'static str,
}

impl ThreadAffinity {
    /// Binds to the calling thread.
    #[must_use]
    pub fn current(name: &'static str) -> Self {
        Self {
            owner: thread::current().id(),
            name,
        }
    }

    /// Whether the calling thread is the owner.
    #[must_use]
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Panics when called off the owning thread.
    ///
    /// # Panics
    ///
    /// Always, if the calling thread is not the owner. This is a broken
    /// caller contract, not a recoverable condition.
    #[track_caller]
    pub fn check(&self) {
        assert!(
            self.is_current(),
            "{} accessed from {:?}, but it is owned by {:?}",
            self.name,
            thread::current().id(),
            self.owner
        );
    }
}
