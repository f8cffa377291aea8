#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Query and control which processors the current process and its threads may execute on, with
//! one interface across platforms whose native affinity APIs differ or are missing entirely.
//!
//! This is part of the [Folo project](https://github.com/folo-rs/folo) that provides mechanisms for
//! high-performance hardware-aware programming in Rust.
//!
//! # Quick start
//!
//! All operations go through the process-wide [`Affinity`] handle:
//!
//! ```rust
//! use thread_affinity::Affinity;
//!
//! let affinity = Affinity::current();
//!
//! println!(
//!     "The {} backend reports {} cores available to this process (mask {:#x})",
//!     affinity.backend_kind(),
//!     affinity.cores().len(),
//!     affinity.process_affinity_mask()?,
//! );
//!
//! // Pin this thread to the first available core.
//! let core = *affinity.cores().first();
//! affinity.pin_current_thread_to(core)?;
//! # Ok::<(), thread_affinity::Error>(())
//! ```
//!
//! Affinity is expressed as an [`AffinityMask`], a single machine word in which bit `i` stands
//! for logical processor `i`. A [`Core`] is a mask with exactly one bit set.
//!
//! # Pinned worker threads
//!
//! Two [`ThreadFactory`] implementations pin the threads they create before the task starts:
//!
//! * [`AffinityThreadFactory`] pins every thread to the same mask.
//! * [`SingleCoreThreadFactory`] pins each new thread to the next single core of a mask,
//!   cycling through the cores in increasing order.
//!
//! ```rust
//! use thread_affinity::{Affinity, SingleCoreThreadFactory, ThreadFactory};
//!
//! let factory = SingleCoreThreadFactory::with_mask(Affinity::current().process_affinity_mask()?)?;
//!
//! let workers = (0..4)
//!     .map(|_| factory.new_thread(|| Affinity::current().thread_affinity_mask()))
//!     .collect::<Result<Vec<_>, _>>()?;
//!
//! for worker in workers {
//!     println!("Worker ran with mask {:#x}", worker.join().unwrap()?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Failing to pin a created thread is logged as a warning via `tracing` and the thread runs
//! without the requested affinity.
//!
//! # Platform support
//!
//! The backend is chosen on first use by probing, most capable first:
//!
//! 1. [`BackendKind::Linux`] uses the Linux scheduler calls for process affinity and to find the
//!    processor the calling thread is executing on.
//! 1. [`BackendKind::PosixThreads`] uses only the threading library. The process affinity is
//!    approximated by the affinity of the calling thread and the current core by the lowest core
//!    of the thread affinity mask. This is what FreeBSD uses.
//! 1. [`BackendKind::Fallback`] is used everywhere else. It reports every logical processor as
//!    available, accepts and ignores all affinity changes and always reports core 0 as current.
//!
//! The chosen backend stays in place for the lifetime of the process.
//!
//! Only the first 64 logical processors can be addressed.

mod affinity;
mod affinity_thread_factory;
mod cpu_core;
mod error;
mod pal;
mod primitive_types;
mod single_core_thread_factory;
mod thread_factory;

pub use affinity::*;
pub use affinity_thread_factory::*;
pub use cpu_core::*;
pub use error::Error;
pub(crate) use error::Result;
pub use primitive_types::{AffinityMask, BackendKind, MASK_BITS, ThreadHandle};
pub use single_core_thread_factory::*;
pub use thread_factory::ThreadFactory;
