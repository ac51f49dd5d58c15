//! Cross-context synchronization primitives.
//!
//! [`StateLock`] is the single arbiter for all non-atomic shared axis
//! state: application-thread accessors acquire it with a bounded wait and
//! get [`Error::Contention`] back instead of blocking indefinitely. The
//! timer/endstop context uses the unbounded form; on std hosts that context
//! is a thread, so a brief block on the lock is sound there.
//!
//! [`EventFlags`] is the wait/signal primitive behind "travel ended" and
//! "homed": a flag word that setters OR into and waiters consume from.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Interval between bounded-lock acquisition attempts.
const RETRY_INTERVAL: Duration = Duration::from_micros(100);

/// A mutex with a bounded acquisition wait.
#[derive(Debug)]
pub struct StateLock<T> {
    inner: Mutex<T>,
    bound: Duration,
}

impl<T> StateLock<T> {
    /// Create a lock around `value` with the given acquisition bound.
    pub fn new(value: T, bound: Duration) -> Self {
        Self {
            inner: Mutex::new(value),
            bound,
        }
    }

    /// The configured acquisition bound.
    #[inline]
    pub fn bound(&self) -> Duration {
        self.bound
    }

    /// Acquire the lock, waiting at most the configured bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Contention`] if the lock could not be taken within
    /// the bound. The caller may retry.
    pub fn lock(&self) -> Result<MutexGuard<'_, T>> {
        let deadline = Instant::now() + self.bound;
        loop {
            match self.inner.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(poisoned)) => return Ok(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return Err(Error::Contention);
                    }
                    thread::yield_now();
                    thread::sleep(RETRY_INTERVAL);
                }
            }
        }
    }

    /// Acquire the lock without a bound.
    ///
    /// Reserved for the timer/endstop context, which must make progress and
    /// is never the thread holding the lock already.
    pub fn lock_unbounded(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A settable flag word with consuming waiters.
///
/// `set` is callable from the timer/endstop context; waiters block on a
/// condition variable and atomically consume the flags that satisfied them.
#[derive(Debug, Default)]
pub struct EventFlags {
    state: Mutex<u32>,
    cond: Condvar,
}

impl EventFlags {
    /// Create an empty flag word.
    pub fn new() -> Self {
        Self::default()
    }

    /// OR `mask` into the flag word and wake all waiters.
    pub fn set(&self, mask: u32) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state |= mask;
        self.cond.notify_all();
    }

    /// Clear `mask` from the flag word without waking anyone.
    pub fn clear(&self, mask: u32) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state &= !mask;
    }

    /// Wait until any flag in `mask` is set, consuming the matched flags.
    ///
    /// Returns the matched flags, or `None` if the timeout elapsed first.
    /// Flags already set on entry satisfy the wait immediately.
    pub fn wait_any(&self, mask: u32, timeout: Duration) -> Option<u32> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            let matched = *state & mask;
            if matched != 0 {
                *state &= !matched;
                return Some(matched);
            }

            let now = Instant::now();
            if now >= deadline {
                return None;
            }

            let (guard, result) = self
                .cond
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
            if result.timed_out() && *state & mask == 0 {
                return None;
            }
        }
    }

    /// Wait without a bound until any flag in `mask` is set.
    pub fn wait_any_forever(&self, mask: u32) -> u32 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            let matched = *state & mask;
            if matched != 0 {
                *state &= !matched;
                return matched;
            }
            state = self
                .cond
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_lock_round_trip() {
        let lock = StateLock::new(41u32, Duration::from_millis(50));
        {
            let mut guard = lock.lock().expect("uncontended lock");
            *guard += 1;
        }
        assert_eq!(*lock.lock().unwrap(), 42);
    }

    #[test]
    fn test_bounded_lock_times_out() {
        let lock = Arc::new(StateLock::new(0u32, Duration::from_millis(20)));
        let held = Arc::clone(&lock);

        let _guard = held.lock_unbounded();
        let contender = {
            let lock = Arc::clone(&lock);
            std::thread::spawn(move || lock.lock().map(|_| ()))
        };

        assert_eq!(contender.join().unwrap(), Err(Error::Contention));
    }

    #[test]
    fn test_flags_already_set_satisfy_wait() {
        let flags = EventFlags::new();
        flags.set(0b10);
        assert_eq!(flags.wait_any(0b10, Duration::from_millis(1)), Some(0b10));
        // Consumed by the wait.
        assert_eq!(flags.wait_any(0b10, Duration::from_millis(1)), None);
    }

    #[test]
    fn test_flags_cross_thread() {
        let flags = Arc::new(EventFlags::new());
        let setter = {
            let flags = Arc::clone(&flags);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(10));
                flags.set(0b1);
            })
        };

        assert_eq!(flags.wait_any(0b1, Duration::from_secs(5)), Some(0b1));
        setter.join().unwrap();
    }

    #[test]
    fn test_wait_times_out() {
        let flags = EventFlags::new();
        let start = Instant::now();
        assert_eq!(flags.wait_any(0b1, Duration::from_millis(30)), None);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_clear_discards_pending_flags() {
        let flags = EventFlags::new();
        flags.set(0b11);
        flags.clear(0b01);
        assert_eq!(flags.wait_any(0b11, Duration::from_millis(1)), Some(0b10));
    }
}
