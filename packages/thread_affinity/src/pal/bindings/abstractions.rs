#![cfg_attr(
    test,
    expect(
        clippy::struct_field_names,
        reason = "false positive from automock generated code"
    )
)]

use std::fmt::Debug;
use std::io;

use crate::{AffinityMask, ThreadHandle};

/// Bindings for FFI calls into the operating system C and threading libraries.
///
/// All native backend FFI calls must go through this trait, enabling them to be mocked. Masks
/// are converted to and from the native processor set representation at this boundary, so only
/// the first [`MASK_BITS`][crate::MASK_BITS] processors are visible above it.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Bindings: Debug + Send + Sync + 'static {
    // sched_getaffinity() for pid 0 (the calling process)
    fn sched_getaffinity_process(&self) -> Result<AffinityMask, io::Error>;

    // sched_setaffinity() for pid 0 (the calling process)
    fn sched_setaffinity_process(&self, mask: AffinityMask) -> Result<(), io::Error>;

    fn sched_getcpu(&self) -> Result<u32, io::Error>;

    fn pthread_self(&self) -> ThreadHandle;

    fn pthread_getaffinity_np(&self, thread: ThreadHandle) -> Result<AffinityMask, io::Error>;

    fn pthread_setaffinity_np(
        &self,
        thread: ThreadHandle,
        mask: AffinityMask,
    ) -> Result<(), io::Error>;

    // Returns the new niceness value.
    fn nice(&self, increment: i32) -> Result<i32, io::Error>;
}
