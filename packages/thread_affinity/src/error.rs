use std::io;

use thiserror::Error;

use crate::AffinityMask;

/// Errors that can occur when querying or changing processor affinity.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An operating system call reported failure. No retry has been attempted.
    #[error("{operation}({arguments}) failed: {source}")]
    NativeCall {
        /// Name of the operating system call that failed.
        operation: &'static str,

        /// The arguments the call was made with, rendered for humans.
        arguments: String,

        /// The error reported by the operating system.
        #[source]
        source: io::Error,
    },

    /// The caller supplied an affinity mask of zero, which would permit execution on no
    /// processor at all. The request was rejected before reaching the operating system.
    #[error("affinity mask must select at least one processor")]
    EmptyMask,

    /// A core was requested for a mask that does not have exactly one bit set.
    #[error("core mask {mask:#x} must have exactly one bit set")]
    InvalidCoreMask {
        /// The offending mask.
        mask: AffinityMask,
    },

    /// The operating system reported a processor index that an affinity mask cannot express.
    #[error("processor {index} cannot be expressed in a single-word affinity mask")]
    CoreOutOfRange {
        /// The processor index reported by the operating system.
        index: u32,
    },

    /// The thread may only execute on processors that an affinity mask cannot express, so no
    /// core of the mask describes where it runs.
    #[error("thread affinity only includes processors beyond the first {bits}")]
    NoAddressableCore {
        /// Number of processors an affinity mask can address.
        bits: u32,
    },
}

impl Error {
    /// The raw status code reported by the operating system, if this error came from a
    /// failing native call.
    #[must_use]
    pub fn return_code(&self) -> Option<i32> {
        match self {
            Self::NativeCall { source, .. } => source.raw_os_error(),
            Self::EmptyMask
            | Self::InvalidCoreMask { .. }
            | Self::CoreOutOfRange { .. }
            | Self::NoAddressableCore { .. } => None,
        }
    }

    pub(crate) fn native_call(
        operation: &'static str,
        arguments: impl Into<String>,
        source: io::Error,
    ) -> Self {
        Self::NativeCall {
            operation,
            arguments: arguments.into(),
            source,
        }
    }
}

/// A specialized `Result` type for affinity operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
