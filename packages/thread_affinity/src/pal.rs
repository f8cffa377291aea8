//! Platform Abstraction Layer (PAL). This is private API.
//!
//! Every backend implements [`Backend`]. The backend used by the process is picked once by
//! [`select_backend()`] and then only ever reached through [`BackendFacade`].

mod abstractions;
pub(crate) use abstractions::*;

mod facade;
pub(crate) use facade::*;

mod fallback;
pub(crate) use fallback::*;

mod selection;
pub(crate) use selection::*;

// The native backends are compiled wherever native bindings exist, and in test mode on all
// platforms, where they run on top of mock bindings.
#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
mod bindings;
#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
pub(crate) use bindings::*;

#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
mod native_calls;
#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
pub(crate) use native_calls::*;

#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
mod linux;
#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
pub(crate) use linux::*;

#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
mod posix;
#[cfg(any(test, all(any(target_os = "linux", target_os = "freebsd"), not(miri))))]
pub(crate) use posix::*;

#[cfg(test)]
mod mocks;
#[cfg(test)]
pub(crate) use mocks::*;
