use std::io;
use std::thread::JoinHandle;

use crate::thread_factory::{PinningPolicy, PinningSpawner};
use crate::{Affinity, AffinityMask, Result, ThreadFactory};

/// Creates threads that are all pinned to the same set of processors.
///
/// The affinity is applied on the new thread before the task starts executing. If the platform
/// refuses the affinity, a warning is logged and the task runs without it.
///
/// Threads are named `pool-<N>-thread-<M>`, where `N` identifies the factory and `M` counts the
/// threads created by it, starting from zero.
///
/// # Example
///
/// ```
/// use thread_affinity::{Affinity, AffinityThreadFactory, ThreadFactory};
///
/// // Keep workers on the first core the process may use.
/// let first_core = *Affinity::current().cores().first();
/// let factory = AffinityThreadFactory::with_mask(first_core.mask())?;
///
/// let handle = factory.new_thread(|| {
///     println!("Worker running on {:?}", Affinity::current().current_core());
/// })?;
///
/// handle.join().unwrap();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct AffinityThreadFactory {
    spawner: PinningSpawner,
}

impl AffinityThreadFactory {
    /// Creates a factory whose threads inherit the affinity mask of the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NativeCall`][crate::Error::NativeCall] if the affinity of the calling
    /// thread cannot be read.
    pub fn new() -> Result<Self> {
        let affinity = Affinity::current();

        Self::with_affinity(affinity.clone(), affinity.thread_affinity_mask()?)
    }

    /// Creates a factory whose threads are pinned to `mask`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyMask`][crate::Error::EmptyMask] if the mask is zero.
    pub fn with_mask(mask: AffinityMask) -> Result<Self> {
        Self::with_affinity(Affinity::current().clone(), mask)
    }

    pub(crate) fn with_affinity(affinity: Affinity, mask: AffinityMask) -> Result<Self> {
        Ok(Self {
            spawner: PinningSpawner::new(affinity, PinningPolicy::WholeMask, mask)?,
        })
    }

    /// Replaces the default `pool-<N>-thread-` prefix of the thread names.
    #[must_use]
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.spawner.set_name_prefix(prefix.into());
        self
    }

    /// Sets the stack size of the created threads, in bytes.
    #[must_use]
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.spawner.set_stack_size(bytes);
        self
    }

    /// The mask every created thread is pinned to.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Trivial delegation.
    pub fn mask(&self) -> AffinityMask {
        self.spawner.mask()
    }
}

impl ThreadFactory for AffinityThreadFactory {
    fn new_thread<F, R>(&self, task: F) -> io::Result<JoinHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.spawner.spawn(task)
    }
}
