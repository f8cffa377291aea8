#![cfg_attr(coverage_nightly, coverage(off))]

use std::fmt::Debug;
use std::io;
#[cfg(test)]
use std::sync::Arc;

#[cfg(all(any(target_os = "linux", target_os = "freebsd"), not(miri)))]
use crate::pal::BuildTargetBindings;
use crate::pal::Bindings;
#[cfg(test)]
use crate::pal::MockBindings;
use crate::{AffinityMask, ThreadHandle};

/// Enum to hide the real/mock choice behind a single wrapper type.
#[derive(Clone)]
pub(crate) enum BindingsFacade {
    #[cfg(all(any(target_os = "linux", target_os = "freebsd"), not(miri)))]
    Target(&'static BuildTargetBindings),

    #[cfg(test)]
    Mock(Arc<MockBindings>),
}

impl BindingsFacade {
    /// The native bindings of the build target, if the build target has any.
    #[cfg(all(any(target_os = "linux", target_os = "freebsd"), not(miri)))]
    pub(crate) const fn target() -> Option<Self> {
        Some(Self::Target(&BuildTargetBindings))
    }

    #[cfg(not(all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
    pub(crate) const fn target() -> Option<Self> {
        None
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockBindings) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Bindings for BindingsFacade {
    fn sched_getaffinity_process(&self) -> Result<AffinityMask, io::Error> {
        match self {
            #[cfg(all(any(target_os = "linux", target_os = "freebsd"), not(miri)))]
            Self::Target(bindings) => bindings.sched_getaffinity_process(),
            #[cfg(test)]
            Self::Mock(mock) => mock.sched_getaffinity_process(),
        }
    }

    fn sched_setaffinity_process(&self, mask: AffinityMask) -> Result<(), io::Error> {
        match self {
            #[cfg(all(any(target_os = "linux", target_os = "freebsd"), not(miri)))]
            Self::Target(bindings) => bindings.sched_setaffinity_process(mask),
            #[cfg(test)]
            Self::Mock(mock) => mock.sched_setaffinity_process(mask),
        }
    }

    fn sched_getcpu(&self) -> Result<u32, io::Error> {
        match self {
            #[cfg(all(any(target_os = "linux", target_os = "freebsd"), not(miri)))]
            Self::Target(bindings) => bindings.sched_getcpu(),
            #[cfg(test)]
            Self::Mock(mock) => mock.sched_getcpu(),
        }
    }

    fn pthread_self(&self) -> ThreadHandle {
        match self {
            #[cfg(all(any(target_os = "linux", target_os = "freebsd"), not(miri)))]
            Self::Target(bindings) => bindings.pthread_self(),
            #[cfg(test)]
            Self::Mock(mock) => mock.pthread_self(),
        }
    }

    fn pthread_getaffinity_np(&self, thread: ThreadHandle) -> Result<AffinityMask, io::Error> {
        match self {
            #[cfg(all(any(target_os = "linux", target_os = "freebsd"), not(miri)))]
            Self::Target(bindings) => bindings.pthread_getaffinity_np(thread),
            #[cfg(test)]
            Self::Mock(mock) => mock.pthread_getaffinity_np(thread),
        }
    }

    fn pthread_setaffinity_np(
        &self,
        thread: ThreadHandle,
        mask: AffinityMask,
    ) -> Result<(), io::Error> {
        match self {
            #[cfg(all(any(target_os = "linux", target_os = "freebsd"), not(miri)))]
            Self::Target(bindings) => bindings.pthread_setaffinity_np(thread, mask),
            #[cfg(test)]
            Self::Mock(mock) => mock.pthread_setaffinity_np(thread, mask),
        }
    }

    fn nice(&self, increment: i32) -> Result<i32, io::Error> {
        match self {
            #[cfg(all(any(target_os = "linux", target_os = "freebsd"), not(miri)))]
            Self::Target(bindings) => bindings.nice(increment),
            #[cfg(test)]
            Self::Mock(mock) => mock.nice(increment),
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl Debug for BindingsFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(all(any(target_os = "linux", target_os = "freebsd"), not(miri)))]
            Self::Target(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}
