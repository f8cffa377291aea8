//! Process-wide handle to the affinity backend selected for the running platform.

use std::sync::{Arc, OnceLock};

use nonempty::NonEmpty;

use crate::pal::{Backend, BackendFacade, select_backend};
use crate::{AffinityMask, BackendKind, Core, Result, ThreadHandle};

/// The real platform backend, selected on first access.
static CURRENT_AFFINITY: OnceLock<Affinity> = OnceLock::new();

/// Entry point for querying and changing processor affinity.
///
/// On first use, the most capable backend that works in the current environment is selected
/// (Linux scheduler calls, then threading library calls, then a no-op fallback) and used for
/// the rest of the process lifetime. The public contract is the same regardless of backend.
///
/// # Example
///
/// ```
/// use thread_affinity::Affinity;
///
/// let affinity = Affinity::current();
///
/// println!("Using the {} backend", affinity.backend_kind());
///
/// for core in affinity.cores().iter() {
///     println!("Process may run on {core}");
/// }
///
/// let core = affinity.current_core()?;
/// println!("This thread is currently executing on {core}");
/// # Ok::<(), thread_affinity::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Affinity {
    backend: Arc<BackendFacade>,
}

impl Affinity {
    /// Returns the process-wide handle, selecting the backend if this is the first use.
    ///
    /// Concurrent first uses all observe the same selected backend. All clones are equivalent.
    #[must_use]
    pub fn current() -> &'static Self {
        CURRENT_AFFINITY.get_or_init(|| Self::from_backend(select_backend()))
    }

    pub(crate) fn from_backend(backend: BackendFacade) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Which backend carries out the operations.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Trivial delegation.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// The core the calling thread is executing on at this moment.
    ///
    /// Unless the thread is pinned to a single core, the answer may be stale as soon as it is
    /// returned because the operating system is free to move the thread. On the POSIX threads
    /// backend this is the lowest core of the thread affinity mask, which is only exact for
    /// threads pinned to a single core.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NativeCall`][crate::Error::NativeCall] if the platform cannot answer.
    /// Returns [`Error::CoreOutOfRange`][crate::Error::CoreOutOfRange] or
    /// [`Error::NoAddressableCore`][crate::Error::NoAddressableCore] if the thread executes on a
    /// processor that an [`AffinityMask`] cannot express.
    pub fn current_core(&self) -> Result<Core> {
        self.backend.current_core()
    }

    /// All cores the process was allowed to execute on when the backend was initialized, in
    /// increasing index order.
    ///
    /// This does not change if the process affinity is narrowed later on.
    #[must_use]
    pub fn cores(&self) -> &NonEmpty<Core> {
        self.backend.cores()
    }

    /// Adjusts the scheduling niceness of the caller by `delta` and returns the value reported
    /// by the platform (the new niceness on native backends, always 0 on the fallback backend).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NativeCall`][crate::Error::NativeCall] if the adjustment is refused,
    /// e.g. lowering niceness without the required privileges.
    pub fn nice(&self, delta: i32) -> Result<i32> {
        self.backend.nice(delta)
    }

    /// The processors the process may execute on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NativeCall`][crate::Error::NativeCall] if the platform call fails.
    pub fn process_affinity_mask(&self) -> Result<AffinityMask> {
        self.backend.process_affinity_mask()
    }

    /// Restricts the processors the process may execute on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyMask`][crate::Error::EmptyMask] for a zero mask on native backends
    /// and [`Error::NativeCall`][crate::Error::NativeCall] if the platform refuses the mask. In
    /// both cases the previous mask remains in effect.
    pub fn set_process_affinity_mask(&self, mask: AffinityMask) -> Result<()> {
        self.backend.set_process_affinity_mask(mask)
    }

    /// The platform handle of the calling thread, for use with the `*_of()` thread operations.
    #[must_use]
    pub fn thread_id(&self) -> ThreadHandle {
        self.backend.current_thread()
    }

    /// The processors the calling thread may execute on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NativeCall`][crate::Error::NativeCall] if the platform call fails.
    pub fn thread_affinity_mask(&self) -> Result<AffinityMask> {
        self.backend
            .thread_affinity_mask(self.backend.current_thread())
    }

    /// The processors the given thread may execute on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NativeCall`][crate::Error::NativeCall] if the platform call fails, for
    /// example because the thread no longer exists.
    pub fn thread_affinity_mask_of(&self, thread: ThreadHandle) -> Result<AffinityMask> {
        self.backend.thread_affinity_mask(thread)
    }

    /// Restricts the processors the calling thread may execute on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyMask`][crate::Error::EmptyMask] for a zero mask on native backends
    /// and [`Error::NativeCall`][crate::Error::NativeCall] if the platform refuses the mask.
    pub fn set_thread_affinity_mask(&self, mask: AffinityMask) -> Result<()> {
        self.backend
            .set_thread_affinity_mask(self.backend.current_thread(), mask)
    }

    /// Restricts the processors the given thread may execute on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyMask`][crate::Error::EmptyMask] for a zero mask on native backends
    /// and [`Error::NativeCall`][crate::Error::NativeCall] if the platform refuses the mask.
    pub fn set_thread_affinity_mask_of(&self, thread: ThreadHandle, mask: AffinityMask) -> Result<()> {
        self.backend.set_thread_affinity_mask(thread, mask)
    }

    /// Pins the calling thread to a single core.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NativeCall`][crate::Error::NativeCall] if the platform refuses the mask.
    #[cfg_attr(test, mutants::skip)] // Trivial delegation.
    pub fn pin_current_thread_to(&self, core: Core) -> Result<()> {
        self.set_thread_affinity_mask(core.mask())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::num::NonZero;
    use std::ptr;

    use mockall::predicate::eq;
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::Error;
    use crate::pal::{BindingsFacade, FallbackBackend, LinuxBackend, MockBindings};

    assert_impl_all!(Affinity: Send, Sync, Clone);

    fn linux_affinity(bindings: MockBindings) -> Affinity {
        Affinity::from_backend(BackendFacade::Linux(
            LinuxBackend::new(BindingsFacade::from_mock(bindings)).unwrap(),
        ))
    }

    #[test]
    fn current_is_singleton() {
        let first = Affinity::current();
        let second = Affinity::current();

        assert!(ptr::eq(first, second));
        assert_eq!(first.backend_kind(), second.backend_kind());
    }

    #[test]
    fn current_selects_same_backend_from_many_threads() {
        let kinds: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| Affinity::current().backend_kind()))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert!(kinds.iter().all(|kind| *kind == kinds[0]));
    }

    #[test]
    fn thread_operations_target_calling_thread() {
        let mut bindings = MockBindings::new();
        bindings
            .expect_sched_getaffinity_process()
            .returning(|| Ok(0b111));
        bindings.expect_sched_getcpu().returning(|| Ok(0));
        bindings.expect_pthread_self().returning(|| ThreadHandle(5));
        bindings
            .expect_pthread_getaffinity_np()
            .with(eq(ThreadHandle(5)))
            .returning(|_| Ok(0b100));
        bindings
            .expect_pthread_setaffinity_np()
            .with(eq(ThreadHandle(5)), eq(0b010))
            .times(2)
            .returning(|_, _| Ok(()));

        let affinity = linux_affinity(bindings);

        assert_eq!(affinity.thread_id(), ThreadHandle(5));
        assert_eq!(affinity.thread_affinity_mask().unwrap(), 0b100);
        assert_eq!(affinity.thread_affinity_mask_of(ThreadHandle(5)).unwrap(), 0b100);

        affinity.set_thread_affinity_mask(0b010).unwrap();
        affinity
            .pin_current_thread_to(Core::from_index(1).unwrap())
            .unwrap();
    }

    #[test]
    fn explicit_thread_operations_pass_handle_through() {
        let mut bindings = MockBindings::new();
        bindings
            .expect_sched_getaffinity_process()
            .returning(|| Ok(0b11));
        bindings.expect_sched_getcpu().returning(|| Ok(0));
        bindings
            .expect_pthread_setaffinity_np()
            .with(eq(ThreadHandle(77)), eq(0b01))
            .times(1)
            .returning(|_, _| Ok(()));

        let affinity = linux_affinity(bindings);

        affinity
            .set_thread_affinity_mask_of(ThreadHandle(77), 0b01)
            .unwrap();
    }

    #[test]
    fn native_errors_propagate_unchanged() {
        let mut bindings = MockBindings::new();
        bindings
            .expect_sched_getaffinity_process()
            .times(1)
            .returning(|| Ok(0b11));
        bindings.expect_sched_getcpu().returning(|| Ok(0));
        bindings
            .expect_nice()
            .returning(|_| Err(std::io::Error::from_raw_os_error(13)));

        let affinity = linux_affinity(bindings);

        let error = affinity.nice(-20).unwrap_err();
        assert!(matches!(error, Error::NativeCall { operation: "nice", .. }));
        assert_eq!(error.return_code(), Some(13));
    }

    #[test]
    fn fallback_contract() {
        let affinity = Affinity::from_backend(
            FallbackBackend::with_processor_count(NonZero::new(6).unwrap()).into(),
        );

        assert_eq!(affinity.backend_kind(), BackendKind::Fallback);
        assert_eq!(affinity.process_affinity_mask().unwrap().count_ones(), 6);
        assert_eq!(affinity.current_core().unwrap().index(), 0);
        assert_eq!(affinity.nice(5).unwrap(), 0);

        affinity.set_thread_affinity_mask(0).unwrap();
        affinity.set_process_affinity_mask(0b1).unwrap();
        assert_eq!(affinity.thread_affinity_mask().unwrap(), 0b11_1111);
    }
}
