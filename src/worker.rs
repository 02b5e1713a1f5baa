//! Latest-wins request slot and the worker thread draining it.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::ResampleError;

/// Lock a mutex, recovering the guard if a holder panicked.
///
/// Every critical section in this crate only swaps or overwrites values, so
/// the guarded state is consistent even after a panic.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A request that can absorb a newer one.
pub(crate) trait Coalesce {
    /// Fold `newer` into `self`; fields set on `newer` win.
    fn merge(&mut self, newer: Self);
}

#[derive(Debug)]
struct SlotState<T> {
    pending: Option<T>,
    closed: bool,
}

/// Single pending request shared by producers and one consumer.
///
/// Submitting into an occupied slot merges instead of queueing, so the
/// consumer only ever sees the latest state at the time it drains.
#[derive(Debug)]
pub(crate) struct LatestSlot<T> {
    state: Mutex<SlotState<T>>,
    wake: Condvar,
}

impl<T: Coalesce> LatestSlot<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                pending: None,
                closed: false,
            }),
            wake: Condvar::new(),
        }
    }

    /// Store or merge a request.
    ///
    /// Returns `true` when the slot went from empty to occupied, which is the
    /// only case that wakes the consumer.
    pub(crate) fn submit(&self, request: T) -> bool {
        let mut state = lock(&self.state);
        if state.closed {
            return false;
        }
        match state.pending.as_mut() {
            Some(pending) => {
                pending.merge(request);
                false
            }
            None => {
                state.pending = Some(request);
                drop(state);
                self.wake.notify_one();
                true
            }
        }
    }

    /// Block until a request is pending and take it.
    ///
    /// Returns `None` once the slot is closed.
    pub(crate) fn take(&self) -> Option<T> {
        let mut state = lock(&self.state);
        loop {
            if state.closed {
                return None;
            }
            if let Some(request) = state.pending.take() {
                return Some(request);
            }
            state = self
                .wake
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Take the pending request without blocking.
    pub(crate) fn try_take(&self) -> Option<T> {
        lock(&self.state).pending.take()
    }

    /// Sleep for `duration` unless the slot is closed first.
    ///
    /// Returns `false` when the slot was closed.
    pub(crate) fn pause(&self, duration: Duration) -> bool {
        let state = lock(&self.state);
        let (state, _) = self
            .wake
            .wait_timeout_while(state, duration, |state| !state.closed)
            .unwrap_or_else(PoisonError::into_inner);
        !state.closed
    }

    /// Close the slot, dropping any pending request and waking the consumer.
    pub(crate) fn close(&self) {
        let mut state = lock(&self.state);
        state.closed = true;
        state.pending = None;
        drop(state);
        self.wake.notify_all();
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self) -> bool {
        lock(&self.state).pending.is_some()
    }
}

/// A named thread draining a [`LatestSlot`].
///
/// Dropping the worker closes the slot and joins the thread, so anything the
/// thread borrowed through `Arc`s is released before the owner goes away.
#[derive(Debug)]
pub(crate) struct Worker<T: Coalesce> {
    slot: Arc<LatestSlot<T>>,
    handle: Option<JoinHandle<()>>,
}

impl<T: Coalesce> Worker<T> {
    /// Spawn `body` on a thread called `name`.
    pub(crate) fn spawn<F>(
        name: &str,
        slot: Arc<LatestSlot<T>>,
        body: F,
    ) -> Result<Self, ResampleError>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(body)
            .map_err(|source| ResampleError::Spawn {
                name: name.to_string(),
                source,
            })?;
        tracing::debug!(thread = name, "worker started");
        Ok(Self {
            slot,
            handle: Some(handle),
        })
    }

    /// Submit a request; see [`LatestSlot::submit`].
    pub(crate) fn submit(&self, request: T) -> bool {
        self.slot.submit(request)
    }
}

impl<T: Coalesce> Drop for Worker<T> {
    fn drop(&mut self) {
        self.slot.close();
        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            // Dropped from a callback running on the worker itself.
            return;
        }
        let name = handle.thread().name().unwrap_or("worker").to_string();
        if handle.join().is_err() {
            tracing::error!(thread = %name, "worker thread panicked");
        } else {
            tracing::debug!(thread = %name, "worker stopped");
        }
    }
}
