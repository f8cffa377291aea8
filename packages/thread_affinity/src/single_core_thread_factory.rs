use std::io;
use std::thread::JoinHandle;

use crate::thread_factory::{PinningPolicy, PinningSpawner};
use crate::{Affinity, AffinityMask, Result, ThreadFactory};

/// Creates threads that are each pinned to a single core, taking the cores of a mask in turn.
///
/// Given a mask selecting `k` cores, the `n`-th thread created by the factory (counting from
/// zero) is pinned to the `(n mod k)`-th core of the mask in increasing index order. A bounded
/// pool of workers created by one factory is thereby spread evenly across the cores.
///
/// The affinity is applied on the new thread before the task starts executing. If the platform
/// refuses the affinity, a warning is logged and the task runs without it.
///
/// # Example
///
/// ```
/// use thread_affinity::{Affinity, SingleCoreThreadFactory, ThreadFactory};
///
/// let factory = SingleCoreThreadFactory::new()?;
///
/// // One worker per core available to this thread.
/// let workers = (0..Affinity::current().cores().len())
///     .map(|_| {
///         factory.new_thread(|| {
///             println!("Worker pinned to {:?}", Affinity::current().thread_affinity_mask());
///         })
///     })
///     .collect::<Result<Vec<_>, _>>()?;
///
/// for worker in workers {
///     worker.join().unwrap();
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SingleCoreThreadFactory {
    spawner: PinningSpawner,
}

impl SingleCoreThreadFactory {
    /// Creates a factory that distributes threads across the cores the calling thread may use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NativeCall`][crate::Error::NativeCall] if the affinity of the calling
    /// thread cannot be read.
    pub fn new() -> Result<Self> {
        let affinity = Affinity::current();

        Self::with_affinity(affinity.clone(), affinity.thread_affinity_mask()?)
    }

    /// Creates a factory that distributes threads across the cores selected by `mask`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyMask`][crate::Error::EmptyMask] if the mask is zero.
    pub fn with_mask(mask: AffinityMask) -> Result<Self> {
        Self::with_affinity(Affinity::current().clone(), mask)
    }

    pub(crate) fn with_affinity(affinity: Affinity, mask: AffinityMask) -> Result<Self> {
        Ok(Self {
            spawner: PinningSpawner::new(affinity, PinningPolicy::RoundRobinCores, mask)?,
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

    /// The mask whose cores the created threads are distributed across.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Trivial delegation.
    pub fn mask(&self) -> AffinityMask {
        self.spawner.mask()
    }
}

impl ThreadFactory for SingleCoreThreadFactory {
    fn new_thread<F, R>(&self, task: F) -> io::Result<JoinHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.spawner.spawn(task)
    }
}
