use derive_more::derive::Display;

/// A set of logical processors, where bit `i` means "may execute on logical processor `i`".
///
/// The mask is a single machine word, so only the first [`MASK_BITS`] logical processors of
/// the system can be expressed. A mask of zero selects no processor and is never a valid
/// target for pinning.
pub type AffinityMask = u64;

/// Number of logical processors an [`AffinityMask`] can address.
pub const MASK_BITS: u32 = AffinityMask::BITS;

/// Opaque platform identifier of a thread, as accepted by the per-thread affinity operations.
///
/// Obtain the handle of the calling thread via [`Affinity::thread_id()`][1]. The handle is only
/// meaningful to the backend that issued it and only while the thread is alive.
///
/// [1]: crate::Affinity::thread_id
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{_0:#x}")]
pub struct ThreadHandle(pub(crate) u64);

impl ThreadHandle {
    /// The raw numeric value of the handle.
    #[must_use]
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Identifies which platform backend carries out affinity operations in this process.
///
/// The backend is chosen once, on first use, by probing the most capable candidate first.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "the probing order is fixed to these three tiers"
)]
pub enum BackendKind {
    /// Linux scheduler calls for process affinity and for the currently executing processor.
    #[display("linux")]
    Linux,

    /// Threading library calls only. Process affinity is approximated by the affinity of the
    /// calling thread and the current core is derived from the thread affinity mask.
    #[display("posix-threads")]
    PosixThreads,

    /// No native support. All processors reported by the runtime are considered available,
    /// affinity changes are accepted and ignored, and the current core is always core 0.
    #[display("fallback")]
    Fallback,
}

/// Returns a mask with the lowest `count` bits set, saturating at a full mask.
pub(crate) fn mask_of_first(count: u32) -> AffinityMask {
    match count {
        0 => 0,
        count if count >= MASK_BITS => AffinityMask::MAX,
        count => AffinityMask::MAX >> MASK_BITS.wrapping_sub(count),
    }
}
