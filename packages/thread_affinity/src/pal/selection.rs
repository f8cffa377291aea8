#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
use thiserror::Error;
use tracing::debug;

use crate::pal::{Backend, BackendFacade, FallbackBackend};
#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
use crate::pal::{BindingsFacade, LinuxBackend, PosixThreadsBackend};
#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
use crate::{BackendKind, Error};

/// A native backend could not be initialized in this environment.
///
/// This only ever tells the selector to try the next candidate and never reaches callers.
#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
#[derive(Debug, Error)]
#[error("{backend} backend is unavailable: {source}")]
pub(crate) struct BackendUnavailable {
    pub(crate) backend: BackendKind,

    #[source]
    pub(crate) source: Error,
}

#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
type Candidate = fn(BindingsFacade) -> Result<BackendFacade, BackendUnavailable>;

/// Native backends in probing order, most capable first.
#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
const NATIVE_CANDIDATES: [Candidate; 2] = [
    |bindings| LinuxBackend::new(bindings).map(BackendFacade::Linux),
    |bindings| PosixThreadsBackend::new(bindings).map(BackendFacade::PosixThreads),
];

/// Probes the backends available to the build target and returns the first one that works.
#[cfg_attr(test, mutants::skip)] // Depends on the machine; covered by integration tests.
pub(crate) fn select_backend() -> BackendFacade {
    #[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
    {
        select_from(BindingsFacade::target())
    }

    #[cfg(not(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri)))))]
    {
        selected(FallbackBackend::new().into())
    }
}

/// Tries each native backend on top of `bindings` in order, falling back to the no-op backend
/// if there are no bindings or none of the native backends initializes.
#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
pub(crate) fn select_from(bindings: Option<BindingsFacade>) -> BackendFacade {
    if let Some(bindings) = bindings {
        for candidate in NATIVE_CANDIDATES {
            match candidate(bindings.clone()) {
                Ok(backend) => return selected(backend),
                Err(unavailable) => debug!(%unavailable, "trying next affinity backend"),
            }
        }
    } else {
        debug!("no native affinity bindings for this platform");
    }

    selected(FallbackBackend::new().into())
}

fn selected(backend: BackendFacade) -> BackendFacade {
    debug!(
        backend = %backend.kind(),
        cores = backend.cores().len(),
        "selected affinity backend"
    );

    backend
}
