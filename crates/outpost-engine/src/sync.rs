//! Shared ownership with bounded-wait locking.
//!
//! A tick owns the whole colony while it runs; player commands must not
//! observe a half-applied tick. [`SharedColony`] serializes both behind one
//! mutex and gives commands a bounded wait: if the lock is not available
//! within the deadline, the caller gets [`EngineError::Busy`] and retries
//! later instead of blocking indefinitely.

use crate::colony::Colony;
use crate::command::{Command, CommandOutcome};
use crate::error::EngineError;
use std::sync::{Arc, Mutex, TryLockError};
use std::time::{Duration, Instant};

/// How long a contended lock attempt sleeps between retries.
const RETRY_INTERVAL: Duration = Duration::from_millis(1);

/// Thread-safe handle to a [`Colony`].
#[derive(Debug, Clone)]
pub struct SharedColony {
    inner: Arc<Mutex<Colony>>,
}

impl SharedColony {
    /// Wrap a colony for shared access.
    pub fn new(colony: Colony) -> Self {
        Self {
            inner: Arc::new(Mutex::new(colony)),
        }
    }

    /// Run `f` with exclusive access, waiting up to `timeout` for the lock.
    /// Returns [`EngineError::Busy`] if a tick (or another command) held the
    /// colony for the whole wait.
    pub fn with<R>(
        &self,
        timeout: Duration,
        f: impl FnOnce(&mut Colony) -> R,
    ) -> Result<R, EngineError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.inner.try_lock() {
                Ok(mut guard) => return Ok(f(&mut guard)),
                Err(TryLockError::Poisoned(poisoned)) => {
                    // A panicked holder cannot have left a half-applied
                    // command: commands validate before mutating. Continue
                    // with the state as-is.
                    return Ok(f(&mut poisoned.into_inner()));
                }
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return Err(EngineError::Busy);
                    }
                    std::thread::sleep(RETRY_INTERVAL);
                }
            }
        }
    }

    /// Execute a command with a bounded wait for the lock.
    pub fn execute(
        &self,
        timeout: Duration,
        command: Command,
    ) -> Result<CommandOutcome, EngineError> {
        self.with(timeout, |colony| colony.execute(command))?
    }
}

// ===========================================================================
// Tests
// ===========================================================================
