use nonempty::NonEmpty;

use crate::pal::{
    Backend, BackendUnavailable, Bindings, BindingsFacade, PthreadCalls, cores_from_mask,
    reject_empty,
};
use crate::{AffinityMask, BackendKind, Core, Error, Result, ThreadHandle};

/// Backend for Linux, where the scheduler offers process-wide affinity calls and can tell us
/// which processor the calling thread is executing on right now.
///
/// Thread affinity goes through the threading library, the same as on the POSIX backend.
#[derive(Debug)]
pub(crate) struct LinuxBackend {
    calls: PthreadCalls,
    cores: NonEmpty<Core>,
}

impl LinuxBackend {
    pub(crate) fn new(bindings: BindingsFacade) -> std::result::Result<Self, BackendUnavailable> {
        let probe = |source| BackendUnavailable {
            backend: BackendKind::Linux,
            source,
        };

        let calls = PthreadCalls::new(bindings);

        let initial_mask = read_process_mask(&calls).map_err(probe)?;

        // Only proves the call is available. The processor we happen to be executing on may be
        // beyond what a mask can express, which is no reason to reject the backend.
        read_current_cpu(&calls).map_err(probe)?;

        let cores = cores_from_mask(initial_mask).map_err(probe)?;

        Ok(Self { calls, cores })
    }
}

impl Backend for LinuxBackend {
    #[cfg_attr(test, mutants::skip)] // Trivial.
    fn kind(&self) -> BackendKind {
        BackendKind::Linux
    }

    fn current_core(&self) -> Result<Core> {
        read_current_core(&self.calls)
    }

    fn cores(&self) -> &NonEmpty<Core> {
        &self.cores
    }

    fn nice(&self, delta: i32) -> Result<i32> {
        self.calls.nice(delta)
    }

    fn process_affinity_mask(&self) -> Result<AffinityMask> {
        read_process_mask(&self.calls)
    }

    fn set_process_affinity_mask(&self, mask: AffinityMask) -> Result<()> {
        reject_empty(mask)?;

        self.calls
            .bindings()
            .sched_setaffinity_process(mask)
            .map_err(|e| Error::native_call("sched_setaffinity", format!("0, {mask:#x}"), e))
    }

    fn current_thread(&self) -> ThreadHandle {
        self.calls.current_thread()
    }

    fn thread_affinity_mask(&self, thread: ThreadHandle) -> Result<AffinityMask> {
        self.calls.thread_affinity_mask(thread)
    }

    fn set_thread_affinity_mask(&self, thread: ThreadHandle, mask: AffinityMask) -> Result<()> {
        self.calls.set_thread_affinity_mask(thread, mask)
    }
}

fn read_process_mask(calls: &PthreadCalls) -> Result<AffinityMask> {
    calls
        .bindings()
        .sched_getaffinity_process()
        .map_err(|e| Error::native_call("sched_getaffinity", "0", e))
}

fn read_current_cpu(calls: &PthreadCalls) -> Result<u32> {
    calls
        .bindings()
        .sched_getcpu()
        .map_err(|e| Error::native_call("sched_getcpu", "", e))
}

fn read_current_core(calls: &PthreadCalls) -> Result<Core> {
    Core::from_index(read_current_cpu(calls)?)
}
