use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted value shared between the streaming worker
/// and the render thread.
///
/// `MtResource` wraps an `Arc<RwLock<T>>`. Cloning it clones the handle, not
/// the value, so both threads observe the same data. It backs the column map
/// and each chunk's voxel grid and mesh.
///
/// # Type Parameters
/// - `T`: The type of the contained resource, must be `Send + Sync`
///
/// # Examples
///
/// ```
/// use std::thread;
/// use voxel_streamer::core::MtResource;
///
/// let loaded = MtResource::new(Vec::<i32>::new());
/// let worker_view = loaded.clone();
///
/// thread::spawn(move || worker_view.get_mut().push(7))
///     .join()
///     .unwrap();
///
/// assert_eq!(*loaded.get(), vec![7]);
/// ```
///
/// # Locking
/// - Readers (`get()`) proceed concurrently
/// - A writer (`get_mut()`) is exclusive and blocks every other access
/// - Guards must not be held across a call that takes the same lock again
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync> MtResource<T> {
    /// Wraps `resource` for shared access.
    ///
    /// # Arguments
    /// * `resource` - The value to be stored in the resource
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read guard for the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned, i.e. another thread panicked while
    /// holding the write guard.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap()
    }

    /// Returns a write guard for the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap()
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

impl<T: Send + Sync + Default> Default for MtResource<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Send + Sync> fmt::Debug for MtResource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MtResource")
            .field("handles", &Arc::strong_count(&self.resource))
            .finish()
    }
}
