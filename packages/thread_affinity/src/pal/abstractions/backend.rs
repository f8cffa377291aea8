use std::fmt::Debug;

use nonempty::NonEmpty;

use crate::{AffinityMask, BackendKind, Core, Result, ThreadHandle};

/// The operations every platform backend implements with identical observable semantics.
///
/// Backends report native failures as [`Error::NativeCall`][crate::Error::NativeCall] and
/// never retry.
pub(crate) trait Backend: Debug + Send + Sync + 'static {
    fn kind(&self) -> BackendKind;

    /// The core the calling thread is executing on right now. Re-resolved on every call.
    fn current_core(&self) -> Result<Core>;

    /// The cores available to the process when the backend was initialized.
    fn cores(&self) -> &NonEmpty<Core>;

    /// Adjusts the niceness of the caller by `delta`, returning the value reported by the
    /// platform.
    fn nice(&self, delta: i32) -> Result<i32>;

    fn process_affinity_mask(&self) -> Result<AffinityMask>;

    fn set_process_affinity_mask(&self, mask: AffinityMask) -> Result<()>;

    fn current_thread(&self) -> ThreadHandle;

    fn thread_affinity_mask(&self, thread: ThreadHandle) -> Result<AffinityMask>;

    fn set_thread_affinity_mask(&self, thread: ThreadHandle, mask: AffinityMask) -> Result<()>;
}
