use std::sync::{Arc, Mutex};

use crate::pal::{BackendFacade, BindingsFacade, LinuxBackend, MockBindings};
use crate::{AffinityMask, ThreadHandle};

/// A Linux backend on mock bindings that allows all 64 cores and records every mask that a
/// thread gets pinned to, in call order.
pub(crate) fn recording_backend(pinned: Arc<Mutex<Vec<AffinityMask>>>) -> BackendFacade {
    let mut bindings = MockBindings::new();
    bindings
        .expect_sched_getaffinity_process()
        .returning(|| Ok(AffinityMask::MAX));
    bindings.expect_sched_getcpu().returning(|| Ok(0));
    bindings.expect_pthread_self().returning(|| ThreadHandle(1));
    bindings
        .expect_pthread_setaffinity_np()
        .returning(move |_, mask| {
            pinned
                .lock()
                .expect("a pinning thread panicked while recording")
                .push(mask);
            Ok(())
        });

    BackendFacade::Linux(
        LinuxBackend::new(BindingsFacade::from_mock(bindings))
            .expect("mock bindings satisfy every probe"),
    )
}
