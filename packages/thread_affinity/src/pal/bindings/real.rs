use std::fmt::Debug;
use std::{io, mem};

use crate::pal::Bindings;
use crate::{AffinityMask, Core, MASK_BITS, ThreadHandle};

#[cfg(target_os = "linux")]
type CpuSet = libc::cpu_set_t;

#[cfg(target_os = "freebsd")]
type CpuSet = libc::cpuset_t;

/// FFI bindings that target the real operating system that the build is targeting.
///
/// You would only use different bindings in PAL unit tests that need to use mock bindings.
/// Even then, whenever possible, unit tests should use real bindings for maximum realism.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetBindings;

// Real OS bindings are excluded from coverage measurement because:
// 1. They are tested via integration tests running on the actual operating system.
// 2. Error paths require OS-level failures that are impractical to trigger in tests.
#[cfg_attr(coverage_nightly, coverage(off))]
impl Bindings for BuildTargetBindings {
    #[cfg(target_os = "linux")]
    fn sched_getaffinity_process(&self) -> Result<AffinityMask, io::Error> {
        let mut cpuset = empty_cpuset();

        // 0 means the calling process.
        // SAFETY: No safety requirements beyond passing valid arguments.
        let result = unsafe { libc::sched_getaffinity(0, size_of::<CpuSet>(), &raw mut cpuset) };

        if result == 0 {
            Ok(cpuset_to_mask(&cpuset))
        } else {
            Err(io::Error::last_os_error())
        }
    }

    #[cfg(target_os = "linux")]
    fn sched_setaffinity_process(&self, mask: AffinityMask) -> Result<(), io::Error> {
        let cpuset = mask_to_cpuset(mask);

        // 0 means the calling process.
        // SAFETY: No safety requirements beyond passing valid arguments.
        let result = unsafe { libc::sched_setaffinity(0, size_of::<CpuSet>(), &raw const cpuset) };

        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    #[cfg(target_os = "linux")]
    fn sched_getcpu(&self) -> Result<u32, io::Error> {
        // SAFETY: No safety requirements.
        let result = unsafe { libc::sched_getcpu() };

        if result >= 0 {
            Ok(result.unsigned_abs())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    // The scheduler affinity calls are Linux-specific. Reporting them as unsupported steers
    // backend selection towards the threading library calls.
    #[cfg(not(target_os = "linux"))]
    fn sched_getaffinity_process(&self) -> Result<AffinityMask, io::Error> {
        Err(io::ErrorKind::Unsupported.into())
    }

    #[cfg(not(target_os = "linux"))]
    fn sched_setaffinity_process(&self, _mask: AffinityMask) -> Result<(), io::Error> {
        Err(io::ErrorKind::Unsupported.into())
    }

    #[cfg(not(target_os = "linux"))]
    fn sched_getcpu(&self) -> Result<u32, io::Error> {
        Err(io::ErrorKind::Unsupported.into())
    }

    fn pthread_self(&self) -> ThreadHandle {
        // SAFETY: No safety requirements.
        let thread = unsafe { libc::pthread_self() };

        ThreadHandle(from_pthread(thread))
    }

    fn pthread_getaffinity_np(&self, thread: ThreadHandle) -> Result<AffinityMask, io::Error> {
        let mut cpuset = empty_cpuset();

        // SAFETY: The thread handle was issued by pthread_self() and the caller is responsible
        // for only passing handles of live threads. The buffer is a valid, owned cpuset.
        let result = unsafe {
            libc::pthread_getaffinity_np(to_pthread(thread), size_of::<CpuSet>(), &raw mut cpuset)
        };

        // The threading library reports the error code directly instead of via errno.
        if result == 0 {
            Ok(cpuset_to_mask(&cpuset))
        } else {
            Err(io::Error::from_raw_os_error(result))
        }
    }

    fn pthread_setaffinity_np(
        &self,
        thread: ThreadHandle,
        mask: AffinityMask,
    ) -> Result<(), io::Error> {
        let cpuset = mask_to_cpuset(mask);

        // SAFETY: The thread handle was issued by pthread_self() and the caller is responsible
        // for only passing handles of live threads. The buffer is a valid, owned cpuset.
        let result = unsafe {
            libc::pthread_setaffinity_np(to_pthread(thread), size_of::<CpuSet>(), &raw const cpuset)
        };

        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::from_raw_os_error(result))
        }
    }

    fn nice(&self, increment: i32) -> Result<i32, io::Error> {
        // -1 is a legitimate niceness, so failure can only be told apart via errno.
        clear_errno();

        // SAFETY: No safety requirements.
        let result = unsafe { libc::nice(increment) };

        if result == -1 {
            let error = io::Error::last_os_error();

            if error.raw_os_error().is_some_and(|code| code != 0) {
                return Err(error);
            }
        }

        Ok(result)
    }
}

fn empty_cpuset() -> CpuSet {
    // SAFETY: All zeroes is a valid (empty) cpuset.
    unsafe { mem::zeroed() }
}

fn mask_to_cpuset(mask: AffinityMask) -> CpuSet {
    let mut cpuset = empty_cpuset();

    for core in Core::all_in(mask) {
        // SAFETY: The index is below MASK_BITS, which is well within the cpuset capacity.
        unsafe { libc::CPU_SET(core.index() as usize, &mut cpuset) };
    }

    cpuset
}

fn cpuset_to_mask(cpuset: &CpuSet) -> AffinityMask {
    (0..MASK_BITS)
        // SAFETY: The index is below MASK_BITS, which is well within the cpuset capacity.
        .filter(|index| unsafe { libc::CPU_ISSET(*index as usize, cpuset) })
        .fold(0, |mask, index| mask | (1 << index))
}

#[cfg(target_os = "linux")]
fn to_pthread(thread: ThreadHandle) -> libc::pthread_t {
    thread.0 as libc::pthread_t
}

#[cfg(target_os = "linux")]
fn from_pthread(thread: libc::pthread_t) -> u64 {
    u64::from(thread)
}

// On FreeBSD the thread handle is a pointer, which we carry around as an address.
#[cfg(target_os = "freebsd")]
fn to_pthread(thread: ThreadHandle) -> libc::pthread_t {
    thread.0 as usize as libc::pthread_t
}

#[cfg(target_os = "freebsd")]
fn from_pthread(thread: libc::pthread_t) -> u64 {
    thread as usize as u64
}

#[cfg(target_os = "linux")]
fn clear_errno() {
    // SAFETY: errno is thread-local and always valid to write.
    unsafe { *libc::__errno_location() = 0 };
}

#[cfg(target_os = "freebsd")]
fn clear_errno() {
    // SAFETY: errno is thread-local and always valid to write.
    unsafe { *libc::__error() = 0 };
}
