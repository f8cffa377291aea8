//! Exercises whichever backend gets selected on the machine running the tests.
//!
//! None of these tests change the affinity of the test thread itself; every mutation happens on
//! a thread spawned for that purpose, so tests running in parallel do not disturb each other.

use std::thread;

use thread_affinity::{
    Affinity, AffinityThreadFactory, BackendKind, Core, Error, SingleCoreThreadFactory,
    ThreadFactory,
};

fn pins_for_real() -> bool {
    Affinity::current().backend_kind() != BackendKind::Fallback
}

#[cfg(target_os = "linux")]
#[test]
#[cfg_attr(miri, ignore)] // Miri cannot call platform APIs.
fn linux_selects_linux_backend() {
    assert_eq!(Affinity::current().backend_kind(), BackendKind::Linux);
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot call platform APIs.
fn cores_are_distinct_single_bits_of_process_mask() {
    let affinity = Affinity::current();

    let cores = affinity.cores();
    let combined = cores.iter().fold(0, |mask, core| mask | core.mask());

    assert_eq!(combined.count_ones() as usize, cores.len());
    assert_eq!(combined, affinity.process_affinity_mask().unwrap());

    for core in cores.iter() {
        assert_eq!(Core::from_mask(core.mask()).unwrap(), *core);
    }
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot call platform APIs.
fn current_core_is_available_to_process() {
    let affinity = Affinity::current();

    match affinity.current_core() {
        Ok(core) => {
            if pins_for_real() {
                assert_ne!(affinity.process_affinity_mask().unwrap() & core.mask(), 0);
            } else {
                assert_eq!(core.index(), 0);
            }
        }
        // The processor may be beyond what a single-word mask can express on huge machines.
        Err(Error::CoreOutOfRange { .. } | Error::NoAddressableCore { .. }) => {}
        Err(error) => panic!("unexpected error: {error}"),
    }
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot call platform APIs.
fn pinned_thread_reports_its_core() {
    let affinity = Affinity::current();
    let core = *affinity.cores().last();

    let (mask, current) = thread::spawn(move || {
        let affinity = Affinity::current();
        affinity.pin_current_thread_to(core).unwrap();

        (
            affinity.thread_affinity_mask().unwrap(),
            affinity.current_core().unwrap(),
        )
    })
    .join()
    .unwrap();

    if pins_for_real() {
        assert_eq!(mask, core.mask());
        assert_eq!(current, core);
    }
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot call platform APIs.
fn zero_mask_leaves_thread_affinity_unchanged() {
    thread::spawn(|| {
        let affinity = Affinity::current();
        let before = affinity.thread_affinity_mask().unwrap();

        let result = affinity.set_thread_affinity_mask(0);

        if pins_for_real() {
            assert!(matches!(result, Err(Error::EmptyMask)));
        } else {
            assert!(result.is_ok());
        }

        assert_eq!(affinity.thread_affinity_mask().unwrap(), before);
    })
    .join()
    .unwrap();
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot call platform APIs.
fn refused_mask_leaves_thread_affinity_unchanged() {
    let highest = 1 << 63;

    // Only meaningful where the last addressable processor does not exist or is off limits.
    if !pins_for_real() || Affinity::current().process_affinity_mask().unwrap() & highest != 0 {
        return;
    }

    thread::spawn(move || {
        let affinity = Affinity::current();
        let before = affinity.thread_affinity_mask().unwrap();

        let error = affinity.set_thread_affinity_mask(highest).unwrap_err();

        assert!(matches!(error, Error::NativeCall { .. }));
        assert!(error.return_code().is_some());
        assert_eq!(affinity.thread_affinity_mask().unwrap(), before);
    })
    .join()
    .unwrap();
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot call platform APIs.
fn thread_handle_addresses_other_thread() {
    let affinity = Affinity::current();

    let (sender, receiver) = std::sync::mpsc::channel();
    let (release, wait_for_release) = std::sync::mpsc::channel::<()>();

    let worker = thread::spawn(move || {
        sender.send(Affinity::current().thread_id()).unwrap();

        // Stay alive while the other thread inspects us.
        wait_for_release.recv().unwrap();
    });

    let worker_handle = receiver.recv().unwrap();
    assert_ne!(worker_handle, affinity.thread_id());

    let worker_mask = affinity.thread_affinity_mask_of(worker_handle).unwrap();
    assert_ne!(worker_mask, 0);

    release.send(()).unwrap();
    worker.join().unwrap();
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot call platform APIs.
fn fixed_mask_factory_pins_every_thread() {
    let core = *Affinity::current().cores().first();
    let factory = AffinityThreadFactory::with_mask(core.mask()).unwrap();

    for _ in 0..3 {
        let mask = factory
            .new_thread(|| Affinity::current().thread_affinity_mask().unwrap())
            .unwrap()
            .join()
            .unwrap();

        if pins_for_real() {
            assert_eq!(mask, core.mask());
        }
    }
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot call platform APIs.
fn single_core_factory_walks_available_cores() {
    let affinity = Affinity::current();
    let factory = SingleCoreThreadFactory::with_mask(affinity.process_affinity_mask().unwrap())
        .unwrap()
        .with_name_prefix("walker-");

    // Two full rounds.
    let rounds = affinity.cores().len() * 2;

    let masks: Vec<_> = (0..rounds)
        .map(|_| {
            factory
                .new_thread(|| Affinity::current().thread_affinity_mask().unwrap())
                .unwrap()
                .join()
                .unwrap()
        })
        .collect();

    if pins_for_real() {
        let expected: Vec<_> = affinity
            .cores()
            .iter()
            .chain(affinity.cores().iter())
            .map(|core| core.mask())
            .collect();

        assert_eq!(masks, expected);
    }
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot call platform APIs.
fn default_factories_inherit_calling_thread_mask() {
    let mask = Affinity::current().thread_affinity_mask().unwrap();

    assert_eq!(AffinityThreadFactory::new().unwrap().mask(), mask);
    assert_eq!(SingleCoreThreadFactory::new().unwrap().mask(), mask);
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot call platform APIs.
fn zero_niceness_adjustment_succeeds() {
    // Raising priority needs privileges, but a zero adjustment is always permitted.
    Affinity::current().nice(0).unwrap();
}
