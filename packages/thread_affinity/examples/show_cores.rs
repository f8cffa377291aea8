//! We report which backend was selected on this machine and describe every core that the
//! current process may execute on.
//!
//! Run with `RUST_LOG=debug` to also see how the backend was selected.

use thread_affinity::Affinity;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), thread_affinity::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let affinity = Affinity::current();

    println!("Backend: {}", affinity.backend_kind());
    println!("Process affinity mask: {:#x}", affinity.process_affinity_mask()?);
    println!("Thread affinity mask: {:#x}", affinity.thread_affinity_mask()?);
    println!("Main thread is executing on {}", affinity.current_core()?);

    for core in affinity.cores().iter() {
        println!("{core} (mask {:#x})", core.mask());
    }

    Ok(())
}
