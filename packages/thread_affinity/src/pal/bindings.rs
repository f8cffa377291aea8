//! FFI bindings used by the native backends, behind a trait so they can be mocked.

mod abstractions;
pub(crate) use abstractions::*;

mod facade;
pub(crate) use facade::*;

#[cfg(all(any(target_os = "linux", target_os = "freebsd"), not(miri)))]
mod real;
#[cfg(all(any(target_os = "linux", target_os = "freebsd"), not(miri)))]
pub(crate) use real::*;
