use std::fmt::Debug;

use nonempty::NonEmpty;

use crate::pal::{Backend, FallbackBackend};
#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
use crate::pal::{LinuxBackend, PosixThreadsBackend};
use crate::{AffinityMask, BackendKind, Core, Result, ThreadHandle};

/// The backend selected for a process, as a closed set of variants.
#[derive(Debug)]
pub(crate) enum BackendFacade {
    #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
    Linux(LinuxBackend),

    #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
    PosixThreads(PosixThreadsBackend),

    Fallback(FallbackBackend),
}

impl Backend for BackendFacade {
    fn kind(&self) -> BackendKind {
        match self {
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::Linux(b) => b.kind(),
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::PosixThreads(b) => b.kind(),
            Self::Fallback(b) => b.kind(),
        }
    }

    fn current_core(&self) -> Result<Core> {
        match self {
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::Linux(b) => b.current_core(),
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::PosixThreads(b) => b.current_core(),
            Self::Fallback(b) => b.current_core(),
        }
    }

    fn cores(&self) -> &NonEmpty<Core> {
        match self {
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::Linux(b) => b.cores(),
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::PosixThreads(b) => b.cores(),
            Self::Fallback(b) => b.cores(),
        }
    }

    fn nice(&self, delta: i32) -> Result<i32> {
        match self {
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::Linux(b) => b.nice(delta),
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::PosixThreads(b) => b.nice(delta),
            Self::Fallback(b) => b.nice(delta),
        }
    }

    fn process_affinity_mask(&self) -> Result<AffinityMask> {
        match self {
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::Linux(b) => b.process_affinity_mask(),
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::PosixThreads(b) => b.process_affinity_mask(),
            Self::Fallback(b) => b.process_affinity_mask(),
        }
    }

    fn set_process_affinity_mask(&self, mask: AffinityMask) -> Result<()> {
        match self {
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::Linux(b) => b.set_process_affinity_mask(mask),
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::PosixThreads(b) => b.set_process_affinity_mask(mask),
            Self::Fallback(b) => b.set_process_affinity_mask(mask),
        }
    }

    fn current_thread(&self) -> ThreadHandle {
        match self {
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::Linux(b) => b.current_thread(),
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::PosixThreads(b) => b.current_thread(),
            Self::Fallback(b) => b.current_thread(),
        }
    }

    fn thread_affinity_mask(&self, thread: ThreadHandle) -> Result<AffinityMask> {
        match self {
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::Linux(b) => b.thread_affinity_mask(thread),
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::PosixThreads(b) => b.thread_affinity_mask(thread),
            Self::Fallback(b) => b.thread_affinity_mask(thread),
        }
    }

    fn set_thread_affinity_mask(&self, thread: ThreadHandle, mask: AffinityMask) -> Result<()> {
        match self {
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::Linux(b) => b.set_thread_affinity_mask(thread, mask),
            #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
            Self::PosixThreads(b) => b.set_thread_affinity_mask(thread, mask),
            Self::Fallback(b) => b.set_thread_affinity_mask(thread, mask),
        }
    }
}

impl From<FallbackBackend> for BackendFacade {
    fn from(backend: FallbackBackend) -> Self {
        Self::Fallback(backend)
    }
}
