use std::num::NonZero;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use nonempty::NonEmpty;

use crate::pal::Backend;
use crate::primitive_types::mask_of_first;
use crate::{AffinityMask, BackendKind, Core, MASK_BITS, Result, ThreadHandle};

/// Source of synthetic thread handles. Handles start at 1 so they are never zero.
static NEXT_THREAD_HANDLE: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_HANDLE: ThreadHandle =
        ThreadHandle(NEXT_THREAD_HANDLE.fetch_add(1, Ordering::Relaxed));
}

/// Backend for platforms without any native affinity support, and the safety net when native
/// backends fail to initialize.
///
/// This implementation provides graceful degradation by:
/// - Considering every logical processor reported by the runtime to be available
/// - Accepting and ignoring every affinity change, including a zero mask
/// - Always reporting core 0 as the current core
/// - Treating niceness adjustment as a no-op that reports 0
///
/// None of its operations ever fail.
#[derive(Debug)]
pub(crate) struct FallbackBackend {
    full_mask: AffinityMask,
    cores: NonEmpty<Core>,
}

impl FallbackBackend {
    pub(crate) fn new() -> Self {
        Self::with_processor_count(thread::available_parallelism().unwrap_or(NonZero::<usize>::MIN))
    }

    /// Processors beyond what an affinity mask can express are not represented.
    pub(crate) fn with_processor_count(processor_count: NonZero<usize>) -> Self {
        let count = u32::try_from(processor_count.get())
            .unwrap_or(MASK_BITS)
            .min(MASK_BITS);

        let full_mask = mask_of_first(count);

        // The mask always includes core 0, which comes first in increasing index order.
        let rest = Core::all_in(full_mask).skip(1).collect();

        Self {
            full_mask,
            cores: NonEmpty::from((Core::FIRST, rest)),
        }
    }
}

impl Default for FallbackBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for FallbackBackend {
    #[cfg_attr(test, mutants::skip)] // Trivial.
    fn kind(&self) -> BackendKind {
        BackendKind::Fallback
    }

    fn current_core(&self) -> Result<Core> {
        Ok(*self.cores.first())
    }

    fn cores(&self) -> &NonEmpty<Core> {
        &self.cores
    }

    fn nice(&self, _delta: i32) -> Result<i32> {
        Ok(0)
    }

    fn process_affinity_mask(&self) -> Result<AffinityMask> {
        Ok(self.full_mask)
    }

    fn set_process_affinity_mask(&self, _mask: AffinityMask) -> Result<()> {
        Ok(())
    }

    fn current_thread(&self) -> ThreadHandle {
        THREAD_HANDLE.with(|handle| *handle)
    }

    fn thread_affinity_mask(&self, _thread: ThreadHandle) -> Result<AffinityMask> {
        Ok(self.full_mask)
    }

    fn set_thread_affinity_mask(&self, _thread: ThreadHandle, _mask: AffinityMask) -> Result<()> {
        Ok(())
    }
}
