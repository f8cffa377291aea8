use nonempty::NonEmpty;

use crate::pal::{Bindings, BindingsFacade};
use crate::{AffinityMask, Core, Error, Result, ThreadHandle};

/// Threading library and C library calls shared by both native backends, translated into the
/// crate's error model.
#[derive(Debug)]
pub(crate) struct PthreadCalls {
    bindings: BindingsFacade,
}

impl PthreadCalls {
    pub(crate) fn new(bindings: BindingsFacade) -> Self {
        Self { bindings }
    }

    pub(crate) fn bindings(&self) -> &BindingsFacade {
        &self.bindings
    }

    pub(crate) fn current_thread(&self) -> ThreadHandle {
        self.bindings.pthread_self()
    }

    pub(crate) fn thread_affinity_mask(&self, thread: ThreadHandle) -> Result<AffinityMask> {
        self.bindings
            .pthread_getaffinity_np(thread)
            .map_err(|e| Error::native_call("pthread_getaffinity_np", format!("{thread}"), e))
    }

    pub(crate) fn set_thread_affinity_mask(
        &self,
        thread: ThreadHandle,
        mask: AffinityMask,
    ) -> Result<()> {
        reject_empty(mask)?;

        self.bindings
            .pthread_setaffinity_np(thread, mask)
            .map_err(|e| {
                Error::native_call("pthread_setaffinity_np", format!("{thread}, {mask:#x}"), e)
            })
    }

    pub(crate) fn nice(&self, delta: i32) -> Result<i32> {
        self.bindings
            .nice(delta)
            .map_err(|e| Error::native_call("nice", delta.to_string(), e))
    }
}

/// A zero mask would leave a thread with nowhere to run, so native backends refuse it before
/// it reaches the operating system.
pub(crate) fn reject_empty(mask: AffinityMask) -> Result<()> {
    if mask == 0 {
        Err(Error::EmptyMask)
    } else {
        Ok(())
    }
}

/// Splits the initial process affinity mask into the cores a backend reports for its lifetime.
pub(crate) fn cores_from_mask(mask: AffinityMask) -> Result<NonEmpty<Core>> {
    NonEmpty::collect(Core::all_in(mask)).ok_or(Error::EmptyMask)
}
