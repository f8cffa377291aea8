use nonempty::NonEmpty;

use crate::pal::{Backend, BackendUnavailable, BindingsFacade, PthreadCalls, cores_from_mask};
use crate::{AffinityMask, BackendKind, Core, Error, MASK_BITS, Result, ThreadHandle};

/// Backend for POSIX systems that offer thread affinity through the threading library but
/// lack the Linux scheduler calls.
///
/// There is no portable process-wide affinity call, so the "process" affinity is the affinity
/// of the calling thread. There is also no "which processor am I on" call, so the current core
/// is the lowest core of the calling thread's affinity mask. That is only exact when the thread
/// is pinned to a single core; for wider masks it is an approximation.
#[derive(Debug)]
pub(crate) struct PosixThreadsBackend {
    calls: PthreadCalls,
    cores: NonEmpty<Core>,
}

impl PosixThreadsBackend {
    pub(crate) fn new(bindings: BindingsFacade) -> std::result::Result<Self, BackendUnavailable> {
        let probe = |source| BackendUnavailable {
            backend: BackendKind::PosixThreads,
            source,
        };

        let calls = PthreadCalls::new(bindings);

        let initial_mask = calls
            .thread_affinity_mask(calls.current_thread())
            .map_err(probe)?;

        let cores = cores_from_mask(initial_mask).map_err(probe)?;

        Ok(Self { calls, cores })
    }
}

impl Backend for PosixThreadsBackend {
    #[cfg_attr(test, mutants::skip)] // Trivial.
    fn kind(&self) -> BackendKind {
        BackendKind::PosixThreads
    }

    fn current_core(&self) -> Result<Core> {
        let mask = self.calls.thread_affinity_mask(self.calls.current_thread())?;

        // A running thread always has some processor, but the mask comes back empty if all of
        // them lie beyond what it can express.
        Core::lowest_in(mask).ok_or(Error::NoAddressableCore { bits: MASK_BITS })
    }

    fn cores(&self) -> &NonEmpty<Core> {
        &self.cores
    }

    fn nice(&self, delta: i32) -> Result<i32> {
        self.calls.nice(delta)
    }

    fn process_affinity_mask(&self) -> Result<AffinityMask> {
        self.calls.thread_affinity_mask(self.calls.current_thread())
    }

    fn set_process_affinity_mask(&self, mask: AffinityMask) -> Result<()> {
        self.calls
            .set_thread_affinity_mask(self.calls.current_thread(), mask)
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

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io;

    use mockall::predicate::eq;

    use super::*;
    use crate::pal::MockBindings;

    const CALLER: ThreadHandle = ThreadHandle(0x1000);

    fn bindings_with_thread_mask(mask: AffinityMask) -> MockBindings {
        let mut bindings = MockBindings::new();
        bindings.expect_pthread_self().returning(|| CALLER);
        bindings
            .expect_pthread_getaffinity_np()
            .with(eq(CALLER))
            .returning(move |_| Ok(mask));
        bindings
    }

    #[test]
    fn cores_come_from_calling_thread_mask() {
        let backend =
            PosixThreadsBackend::new(BindingsFacade::from_mock(bindings_with_thread_mask(0b10_0101)))
                .unwrap();

        let indexes: Vec<_> = backend.cores().iter().map(|c| c.index()).collect();
        assert_eq!(indexes, [0, 2, 5]);
        assert_eq!(backend.kind(), BackendKind::PosixThreads);
    }

    #[test]
    fn current_core_is_lowest_bit_of_thread_mask() {
        let backend =
            PosixThreadsBackend::new(BindingsFacade::from_mock(bindings_with_thread_mask(0b1100)))
                .unwrap();

        assert_eq!(backend.current_core().unwrap().index(), 2);
    }

    #[test]
    fn process_mask_is_calling_thread_mask() {
        let mut bindings = bindings_with_thread_mask(0b0110);
        bindings
            .expect_pthread_setaffinity_np()
            .with(eq(CALLER), eq(0b0100))
            .times(1)
            .returning(|_, _| Ok(()));
        bindings.expect_sched_getaffinity_process().never();
        bindings.expect_sched_setaffinity_process().never();

        let backend = PosixThreadsBackend::new(BindingsFacade::from_mock(bindings)).unwrap();

        assert_eq!(backend.process_affinity_mask().unwrap(), 0b0110);
        backend.set_process_affinity_mask(0b0100).unwrap();
    }

    #[test]
    fn set_process_mask_zero_is_rejected() {
        let mut bindings = bindings_with_thread_mask(0b1);
        bindings.expect_pthread_setaffinity_np().never();

        let backend = PosixThreadsBackend::new(BindingsFacade::from_mock(bindings)).unwrap();

        assert!(matches!(
            backend.set_process_affinity_mask(0),
            Err(Error::EmptyMask)
        ));
    }

    #[test]
    fn current_core_propagates_read_failure() {
        let mut bindings = MockBindings::new();
        bindings.expect_pthread_self().returning(|| CALLER);

        let mut sequence = mockall::Sequence::new();
        bindings
            .expect_pthread_getaffinity_np()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(0b1));
        bindings
            .expect_pthread_getaffinity_np()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Err(io::Error::from_raw_os_error(3)));

        let backend = PosixThreadsBackend::new(BindingsFacade::from_mock(bindings)).unwrap();

        assert_eq!(backend.current_core().unwrap_err().return_code(), Some(3));
    }

    #[test]
    fn current_core_when_thread_runs_only_beyond_mask_width() {
        let mut bindings = MockBindings::new();
        bindings.expect_pthread_self().returning(|| CALLER);

        let mut sequence = mockall::Sequence::new();
        bindings
            .expect_pthread_getaffinity_np()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(0b11));
        // Narrowed to processors at index 64 and above, which the mask conversion drops.
        bindings
            .expect_pthread_getaffinity_np()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(0));

        let backend = PosixThreadsBackend::new(BindingsFacade::from_mock(bindings)).unwrap();

        assert!(matches!(
            backend.current_core(),
            Err(Error::NoAddressableCore { bits: 64 })
        ));
    }

    #[test]
    fn unavailable_when_thread_mask_unreadable() {
        let mut bindings = MockBindings::new();
        bindings.expect_pthread_self().returning(|| CALLER);
        bindings
            .expect_pthread_getaffinity_np()
            .returning(|_| Err(io::ErrorKind::Unsupported.into()));

        let result = PosixThreadsBackend::new(BindingsFacade::from_mock(bindings));

        assert!(matches!(
            result,
            Err(BackendUnavailable {
                backend: BackendKind::PosixThreads,
                ..
            })
        ));
    }
}
