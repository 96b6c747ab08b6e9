//! Serialised process-environment mutation for tests.
//!
//! Every mutation goes through one global re-entrant mutex and returns an
//! [`EnvVarGuard`] that restores the previous value (or removes the
//! variable) when dropped. Guards for the same key restore in LIFO order.
//!
//! Tests that read variables written by the code under test (the env-file
//! synchroniser exports into the process environment) should hold an
//! [`EnvScope`] so no other test observes or clobbers those keys meanwhile.
//!
//! # Examples
//!
//! ```
//! use wiregen_test_helpers::env;
//!
//! let _g = env::set_var("WIREGEN_DOC_KEY", "VALUE");
//! assert_eq!(std::env::var("WIREGEN_DOC_KEY").as_deref(), Ok("VALUE"));
//! ```

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::LazyLock;

static ENV_MUTEX: LazyLock<ReentrantMutex<()>> = LazyLock::new(ReentrantMutex::default);

/// Wrapper around `std::env::set_var`.
///
/// # Safety
///
/// Callers must hold `ENV_MUTEX`.
unsafe fn env_set_var(key: &str, value: &OsStr) {
    unsafe { env::set_var(key, value) };
}

/// Wrapper around `std::env::remove_var`.
///
/// # Safety
///
/// Callers must hold `ENV_MUTEX`.
unsafe fn env_remove_var(key: &str) {
    unsafe { env::remove_var(key) };
}

fn mutate<F>(key: String, mutator: F) -> EnvVarGuard
where
    F: FnOnce(&str),
{
    let _guard = ENV_MUTEX.lock();
    let original = env::var_os(&key);
    mutator(&key);
    EnvVarGuard { key, original }
}

/// RAII guard restoring an environment variable to its prior value on drop.
#[must_use = "dropping restores the prior value"]
pub struct EnvVarGuard {
    key: String,
    original: Option<OsString>,
}

impl fmt::Debug for EnvVarGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVarGuard")
            .field("key", &self.key)
            .field("had_original", &self.original.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        let _guard = ENV_MUTEX.lock();
        if let Some(val) = self.original.take() {
            // SAFETY: `ENV_MUTEX` is held.
            unsafe { env_set_var(&self.key, &val) };
        } else {
            // SAFETY: `ENV_MUTEX` is held.
            unsafe { env_remove_var(&self.key) };
        }
    }
}

/// Sets an environment variable and returns a guard restoring its prior value.
pub fn set_var<K, V>(key: K, value: V) -> EnvVarGuard
where
    K: Into<String>,
    V: AsRef<OsStr>,
{
    // SAFETY: `mutate` holds `ENV_MUTEX` while the closure runs.
    mutate(key.into(), |k| unsafe { env_set_var(k, value.as_ref()) })
}

/// Removes an environment variable and returns a guard restoring its prior value.
///
/// # Examples
/// ```
/// use wiregen_test_helpers::env;
/// let _g = env::remove_var("WIREGEN_DOC_REMOVED");
/// assert!(std::env::var("WIREGEN_DOC_REMOVED").is_err());
/// ```
pub fn remove_var<K>(key: K) -> EnvVarGuard
where
    K: Into<String>,
{
    // SAFETY: `mutate` holds `ENV_MUTEX` while the closure runs.
    mutate(key.into(), |k| unsafe { env_remove_var(k) })
}

/// Holds the global environment lock for the lifetime of the value.
#[must_use = "dropping releases the environment lock"]
pub struct EnvVarLock {
    _guard: ReentrantMutexGuard<'static, ()>,
}

/// Acquires the global environment lock.
pub fn lock() -> EnvVarLock {
    EnvVarLock {
        _guard: ENV_MUTEX.lock(),
    }
}

/// Holds the environment lock while retaining a set of guards.
///
/// Guards are restored before the lock is released.
///
/// # Examples
/// ```
/// use wiregen_test_helpers::env;
///
/// let _scope = env::EnvScope::new(vec![
///     env::remove_var("WIREGEN_DOC_A"),
///     env::set_var("WIREGEN_DOC_B", "b"),
/// ]);
/// ```
#[must_use = "dropping releases the environment lock and restores guards"]
pub struct EnvScope {
    guards: Vec<EnvVarGuard>,
    _lock: EnvVarLock,
}

impl EnvScope {
    /// Creates a scope that holds the global lock and retains `guards`.
    pub fn new(guards: Vec<EnvVarGuard>) -> Self {
        Self {
            _lock: lock(),
            guards,
        }
    }

    /// Creates a scope that clears `keys` for its lifetime.
    pub fn cleared<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let held = lock();
        let guards = keys.into_iter().map(remove_var).collect();
        Self {
            guards,
            _lock: held,
        }
    }

    /// Adds a guard to the scope.
    pub fn push(&mut self, guard: EnvVarGuard) {
        self.guards.push(guard);
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}

/// Runs `f` while holding the global environment lock.
pub fn with_lock<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock();
    f()
}
