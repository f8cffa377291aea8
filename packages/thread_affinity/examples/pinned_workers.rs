//! We start one worker per available core, each pinned to its own core, and let every worker
//! report where it ended up executing.
//!
//! Run with `RUST_LOG=debug` to see the pinning of each worker as it happens.

use std::error::Error;

use thread_affinity::{Affinity, SingleCoreThreadFactory, ThreadFactory};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let affinity = Affinity::current();

    let factory = SingleCoreThreadFactory::with_mask(affinity.process_affinity_mask()?)?
        .with_name_prefix("worker-");

    let workers = (0..affinity.cores().len())
        .map(|_| {
            factory.new_thread(|| {
                let affinity = Affinity::current();

                let name = std::thread::current()
                    .name()
                    .unwrap_or_default()
                    .to_owned();

                (name, affinity.thread_affinity_mask(), affinity.current_core())
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for worker in workers {
        let (name, mask, core) = worker.join().map_err(|_| "worker thread panicked")?;

        println!("{name}: mask {:#x}, executing on {}", mask?, core?);
    }

    Ok(())
}
