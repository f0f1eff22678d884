//! One-shot completion signal shared between the foreground and the indicator thread

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct SignalState {
    done: Mutex<bool>,
    cvar: Condvar,
}

impl SignalState {
    fn lock(&self) -> MutexGuard<'_, bool> {
        // The flag only ever goes false -> true, so a poisoned value is still valid
        self.done.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Single-writer completion flag.
///
/// The owner sets it exactly once with [`CompletionSignal::set`]; any number
/// of [`CompletionObserver`]s can check or wait on it. Once set it never
/// resets.
#[derive(Debug, Default)]
pub struct CompletionSignal {
    state: Arc<SignalState>,
}

/// Read-only view of a [`CompletionSignal`]
#[derive(Debug, Clone)]
pub struct CompletionObserver {
    state: Arc<SignalState>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out an observer that can be moved to another thread
    pub fn observer(&self) -> CompletionObserver {
        CompletionObserver {
            state: Arc::clone(&self.state),
        }
    }

    /// Mark completion and wake every waiting observer
    pub fn set(&self) {
        let mut done = self.state.lock();
        *done = true;
        self.state.cvar.notify_all();
    }

    pub fn is_set(&self) -> bool {
        *self.state.lock()
    }
}

impl CompletionObserver {
    pub fn is_set(&self) -> bool {
        *self.state.lock()
    }

    /// Wait up to `timeout` for the signal. Returns whether it is set.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let done = self.state.lock();
        let (done, _) = self
            .state
            .cvar
            .wait_timeout_while(done, timeout, |done| !*done)
            .unwrap_or_else(PoisonError::into_inner);
        *done
    }
}
