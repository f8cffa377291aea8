use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::{Affinity, AffinityMask, Core, Error, Result};

/// Creates threads for tasks, applying some policy to each created thread before the task
/// starts executing on it.
///
/// This is implemented by [`AffinityThreadFactory`][crate::AffinityThreadFactory] and
/// [`SingleCoreThreadFactory`][crate::SingleCoreThreadFactory], which pin each thread they
/// create to a set of processors.
pub trait ThreadFactory {
    /// Spawns a new thread that executes `task` once the factory policy has been applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the operating system fails to create the thread. Failing to apply
    /// the policy to the created thread is not an error; the task still runs.
    fn new_thread<F, R>(&self, task: F) -> io::Result<JoinHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static;
}

/// Process-wide counter used to name the threads of each factory distinctly.
static NEXT_POOL_NUMBER: AtomicUsize = AtomicUsize::new(1);

/// Decides which mask the n-th thread of a factory is pinned to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PinningPolicy {
    /// Every thread is pinned to the whole factory mask.
    WholeMask,

    /// Each thread is pinned to the next single core of the factory mask, cycling.
    RoundRobinCores,
}

impl PinningPolicy {
    pub(crate) fn mask_for(self, factory_mask: AffinityMask, sequence: usize) -> AffinityMask {
        match self {
            Self::WholeMask => factory_mask,
            Self::RoundRobinCores => {
                let core_count = factory_mask.count_ones() as usize;

                // The factory mask is never empty, so the remainder always exists.
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "remainder is less than the core count, which fits in u32"
                )]
                let nth = sequence.checked_rem(core_count).unwrap_or_default() as u32;

                Core::nth_in(factory_mask, nth).map_or(factory_mask, Core::mask)
            }
        }
    }
}

/// The thread creation machinery shared by the pinning thread factories.
#[derive(Debug)]
pub(crate) struct PinningSpawner {
    affinity: Affinity,
    policy: PinningPolicy,
    mask: AffinityMask,

    name_prefix: String,
    stack_size: Option<usize>,

    /// Sequence number of the next thread created. Each created thread takes exactly one and a
    /// failed creation takes none, so the lock is held until the operating system has answered.
    next_sequence: Mutex<usize>,
}

impl PinningSpawner {
    pub(crate) fn new(affinity: Affinity, policy: PinningPolicy, mask: AffinityMask) -> Result<Self> {
        if mask == 0 {
            return Err(Error::EmptyMask);
        }

        let pool_number = NEXT_POOL_NUMBER.fetch_add(1, Ordering::Relaxed);

        Ok(Self {
            affinity,
            policy,
            mask,
            name_prefix: format!("pool-{pool_number}-thread-"),
            stack_size: None,
            next_sequence: Mutex::new(0),
        })
    }

    pub(crate) fn mask(&self) -> AffinityMask {
        self.mask
    }

    pub(crate) fn set_name_prefix(&mut self, prefix: String) {
        self.name_prefix = prefix;
    }

    pub(crate) fn set_stack_size(&mut self, bytes: usize) {
        self.stack_size = Some(bytes);
    }

    pub(crate) fn spawn<F, R>(&self, task: F) -> io::Result<JoinHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        // A poisoned counter is still a valid counter.
        let mut next_sequence = self
            .next_sequence
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let sequence = *next_sequence;
        let thread_mask = self.policy.mask_for(self.mask, sequence);
        let name = format!("{}{sequence}", self.name_prefix);

        let mut builder = thread::Builder::new().name(name.clone());

        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let affinity = self.affinity.clone();

        let handle = builder.spawn(move || {
            pin_current_thread(&affinity, thread_mask, &name);
            task()
        })?;

        *next_sequence = sequence.wrapping_add(1);

        Ok(handle)
    }
}

/// Pinning failures are reported and otherwise ignored. An unpinned thread is still correct.
fn pin_current_thread(affinity: &Affinity, mask: AffinityMask, thread_name: &str) {
    debug!(thread = thread_name, mask = %format_args!("{mask:#x}"), "pinning new thread");

    match affinity.set_thread_affinity_mask(mask) {
        Ok(()) => {
            debug!(thread = thread_name, mask = %format_args!("{mask:#x}"), "pinned new thread");
        }
        Err(error) => {
            warn!(
                thread = thread_name,
                mask = %format_args!("{mask:#x}"),
                %error,
                "failed to pin new thread; it will run without affinity"
            );
        }
    }
}
