//! Reusable scratch buffers for worker processing.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Idle buffers kept by default.
pub const DEFAULT_MAX_IDLE: usize = 16;

/// Pool of reusable `String` buffers.
///
/// Buffers are cleared on every acquisition, so nothing written while
/// processing one task is visible to the next.
#[derive(Debug, Clone)]
pub struct ScratchPool {
    idle: Arc<Mutex<Vec<String>>>,
    max_idle: usize,
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE)
    }
}

impl ScratchPool {
    /// Creates a pool that retains at most `max_idle` returned buffers.
    #[must_use]
    pub fn new(max_idle: usize) -> Self {
        Self {
            idle: Arc::new(Mutex::new(Vec::with_capacity(max_idle))),
            max_idle,
        }
    }

    /// Takes a cleared buffer from the pool, allocating when none is idle.
    #[must_use]
    pub fn acquire(&self) -> ScratchBuffer {
        let mut buffer = self.lock().pop().unwrap_or_default();
        buffer.clear();
        ScratchBuffer {
            buffer,
            pool: self.clone(),
        }
    }

    /// Returns the number of idle buffers.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, buffer: String) {
        let mut idle = self.lock();
        if idle.len() < self.max_idle {
            idle.push(buffer);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Buffer borrowed from a [`ScratchPool`]; returned to the pool on drop.
#[derive(Debug)]
pub struct ScratchBuffer {
    buffer: String,
    pool: ScratchPool,
}

impl Deref for ScratchBuffer {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl DerefMut for ScratchBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

impl Drop for ScratchBuffer {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buffer));
    }
}
