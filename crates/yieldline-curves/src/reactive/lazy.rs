//! Calculate-on-read cache with explicit invalidation.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};

use crate::error::{CurveError, CurveResult};

enum CacheState<T> {
    Stale,
    Computing,
    Fresh(Arc<T>),
}

/// Tri-state cache behind a lazily calculated object.
///
/// A read of a stale cache runs the calculation; concurrent readers on
/// other threads block until it finishes and then share the result. A read
/// from inside the calculation on the same thread fails with
/// [`CurveError::RecursiveCalculation`] instead of deadlocking.
///
/// Failed calculations leave the cache stale so the next read retries.
///
/// # Example
///
/// ```rust
/// use yieldline_curves::reactive::LazyCache;
///
/// let cache = LazyCache::new("answer");
/// assert_eq!(*cache.get_or_calculate(|| Ok(42)).unwrap(), 42);
/// assert!(cache.is_calculated());
///
/// // Fresh values are returned without recalculating
/// assert_eq!(*cache.get_or_calculate(|| Ok(0)).unwrap(), 42);
///
/// assert!(cache.invalidate());
/// assert_eq!(*cache.get_or_calculate(|| Ok(7)).unwrap(), 7);
/// ```
pub struct LazyCache<T> {
    label: String,
    state: Mutex<CacheState<T>>,
    calculation: ReentrantMutex<()>,
    generation: AtomicU64,
    frozen: AtomicBool,
    last_error: Mutex<Option<CurveError>>,
}

impl<T> LazyCache<T> {
    /// Creates a stale cache. `label` names the object in errors.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            state: Mutex::new(CacheState::Stale),
            calculation: ReentrantMutex::new(()),
            generation: AtomicU64::new(0),
            frozen: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// Returns the cached value, calculating it first if stale.
    ///
    /// If an invalidation arrives while `calculate` runs, its result is
    /// returned but not cached.
    pub fn get_or_calculate<F>(&self, calculate: F) -> CurveResult<Arc<T>>
    where
        F: FnOnce() -> CurveResult<T>,
    {
        if let CacheState::Fresh(value) = &*self.state.lock() {
            return Ok(Arc::clone(value));
        }

        let _serialized = self.calculation.lock();
        {
            let mut state = self.state.lock();
            match &*state {
                CacheState::Fresh(value) => return Ok(Arc::clone(value)),
                // Other threads wait on `calculation`; only this one can get here.
                CacheState::Computing => {
                    return Err(CurveError::recursive_calculation(self.label.clone()))
                }
                CacheState::Stale => *state = CacheState::Computing,
            }
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let mut reset = ResetOnUnwind {
            state: &self.state,
            armed: true,
        };
        let outcome = calculate();
        reset.armed = false;

        let mut state = self.state.lock();
        match outcome {
            Ok(value) => {
                let value = Arc::new(value);
                *state = if self.generation.load(Ordering::SeqCst) == generation {
                    CacheState::Fresh(Arc::clone(&value))
                } else {
                    CacheState::Stale
                };
                *self.last_error.lock() = None;
                Ok(value)
            }
            Err(err) => {
                *state = CacheState::Stale;
                *self.last_error.lock() = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Drops the cached value. Returns true if a fresh value was dropped.
    ///
    /// Ignored while frozen.
    pub fn invalidate(&self) -> bool {
        if self.frozen.load(Ordering::SeqCst) {
            return false;
        }
        self.force_invalidate()
    }

    /// Drops the cached value even when frozen.
    pub fn force_invalidate(&self) -> bool {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if matches!(*state, CacheState::Fresh(_)) {
            *state = CacheState::Stale;
            true
        } else {
            false
        }
    }

    /// Returns true if a fresh value is cached.
    pub fn is_calculated(&self) -> bool {
        matches!(*self.state.lock(), CacheState::Fresh(_))
    }

    /// Returns the cached value without calculating.
    pub fn peek(&self) -> Option<Arc<T>> {
        match &*self.state.lock() {
            CacheState::Fresh(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Error of the most recent failed calculation, cleared on success.
    pub fn last_error(&self) -> Option<CurveError> {
        self.last_error.lock().clone()
    }

    /// Stops invalidations from dropping the cached value.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::SeqCst);
    }

    /// Re-enables invalidation and invalidates.
    pub fn unfreeze(&self) -> bool {
        self.frozen.store(false, Ordering::SeqCst);
        self.invalidate()
    }

    /// Returns true if frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::SeqCst)
    }

    /// Returns the label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T> fmt::Debug for LazyCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.lock() {
            CacheState::Stale => "stale",
            CacheState::Computing => "computing",
            CacheState::Fresh(_) => "fresh",
        };
        f.debug_struct("LazyCache")
            .field("label", &self.label)
            .field("state", &state)
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

// A panicking calculation must not leave the cache stuck in `Computing`.
struct ResetOnUnwind<'a, T> {
    state: &'a Mutex<CacheState<T>>,
    armed: bool,
}

impl<T> Drop for ResetOnUnwind<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock();
            if matches!(*state, CacheState::Computing) {
                *state = CacheState::Stale;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn test_calculates_once() {
        let cache = LazyCache::new("test");
        let calls = AtomicUsize::new(0);
        let calc = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(1.5)
        };

        assert_eq!(*cache.get_or_calculate(calc).unwrap(), 1.5);
        assert_eq!(*cache.get_or_calculate(calc).unwrap(), 1.5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(cache.invalidate());
        assert!(!cache.invalidate());
        cache.get_or_calculate(calc).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failure_retries_on_next_read() {
        let cache: LazyCache<f64> = LazyCache::new("flaky");
        let err = cache
            .get_or_calculate(|| Err(CurveError::invalid_argument("no data")))
            .unwrap_err();
        assert!(matches!(err, CurveError::InvalidArgument { .. }));
        assert!(!cache.is_calculated());
        assert!(cache.last_error().is_some());

        assert_eq!(*cache.get_or_calculate(|| Ok(2.0)).unwrap(), 2.0);
        assert!(cache.last_error().is_none());
    }

    #[test]
    fn test_recursive_read_fails() {
        let cache: LazyCache<i32> = LazyCache::new("self-referential");
        let err = cache
            .get_or_calculate(|| {
                let inner = cache.get_or_calculate(|| Ok(1));
                assert!(matches!(inner, Err(CurveError::RecursiveCalculation { .. })));
                inner.map(|v| *v)
            })
            .unwrap_err();
        assert!(matches!(err, CurveError::RecursiveCalculation { ref object } if object == "self-referential"));
        // The cache recovers
        assert_eq!(*cache.get_or_calculate(|| Ok(3)).unwrap(), 3);
    }

    #[test]
    fn test_invalidation_during_calculation_not_cached() {
        let cache = LazyCache::new("racy");
        let value = cache
            .get_or_calculate(|| {
                cache.invalidate();
                Ok(5)
            })
            .unwrap();
        assert_eq!(*value, 5);
        assert!(!cache.is_calculated());
    }

    #[test]
    fn test_freeze() {
        let cache = LazyCache::new("frozen");
        cache.get_or_calculate(|| Ok(1)).unwrap();
        cache.freeze();
        assert!(!cache.invalidate());
        assert!(cache.is_calculated());

        assert!(cache.unfreeze());
        assert!(!cache.is_calculated());
    }

    #[test]
    fn test_panic_resets_state() {
        let cache = Arc::new(LazyCache::new("panicky"));
        let shared = Arc::clone(&cache);
        let result = thread::spawn(move || {
            let _ = shared.get_or_calculate(|| -> CurveResult<i32> { panic!("calculation panicked") });
        })
        .join();
        assert!(result.is_err());
        assert_eq!(*cache.get_or_calculate(|| Ok(9)).unwrap(), 9);
    }

    #[test]
    fn test_concurrent_readers_share_one_calculation() {
        let cache = Arc::new(LazyCache::new("shared"));
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    *cache
                        .get_or_calculate(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(std::time::Duration::from_millis(5));
                            Ok(11)
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 11);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
