use parking_lot::Mutex;

/// Thread-safe holder for a single value shared between the control
/// surface and the audio callbacks.
///
/// `get`/`set`/`update` are atomic with respect to each other: no thread
/// ever observes a partially-written value. The critical section is a
/// single copy or closure call, so the audio thread's wait is short and
/// bounded (parking_lot mutexes spin briefly and never touch the kernel
/// on the uncontended path).
pub struct SynchronizedCell<T> {
    inner: Mutex<T>,
}

impl<T: Clone> SynchronizedCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Returns the last fully-written value.
    pub fn get(&self) -> T {
        self.inner.lock().clone()
    }

    pub fn set(&self, value: T) {
        *self.inner.lock() = value;
    }

    /// Read-modify-write under a single critical section.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<T: Clone + Default> Default for SynchronizedCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
