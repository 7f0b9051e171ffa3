/*!
 * Teardown Tests
 *
 * Every exit path leaves object wait queues as they were before the call
 */

use objwait_kernel::core::limits::INFINITE_TIMEOUT;
use objwait_kernel::wait::Waitable;
use objwait_kernel::{
    ObjectWaitSyscalls, WaitConfig, WaitDescriptor, WaitEvents, WaitFlags, WaitOutcome,
};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn kernel() -> ObjectWaitSyscalls {
    ObjectWaitSyscalls::with_config(WaitConfig::long_wait())
}

#[test]
fn test_repeated_timeouts_do_not_leak_waiters() {
    let k = kernel();
    let sem = k.registry().create_semaphore(0);
    let port = k.registry().create_port(4);
    let fd = k.registry().open_descriptor(8);

    for _ in 0..20 {
        let mut descs = [
            WaitDescriptor::semaphore(sem.id()),
            WaitDescriptor::port(port.id(), WaitEvents::READ),
            WaitDescriptor::descriptor(fd.id(), WaitEvents::READ),
        ];
        let outcome = k
            .wait_for_objects(1, &mut descs, WaitFlags::RELATIVE_TIMEOUT, 1_000)
            .unwrap();
        assert_eq!(outcome, WaitOutcome::TimedOut);
    }

    assert_eq!(sem.waiter_count(), 0);
    assert_eq!(port.waiter_count(), 0);
    assert_eq!(fd.waiter_count(), 0);
}

#[test]
fn test_waiters_removed_from_objects_that_did_not_fire() {
    let k = kernel();
    let quiet = k.registry().create_semaphore(0);
    let loud = k.registry().create_semaphore(0);
    let releaser = loud.clone();

    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        releaser.release(1).unwrap();
    });

    let mut descs = [
        WaitDescriptor::semaphore(quiet.id()),
        WaitDescriptor::semaphore(loud.id()),
    ];
    let outcome = k
        .wait_for_objects(1, &mut descs, WaitFlags::empty(), INFINITE_TIMEOUT)
        .unwrap();
    handle.join().unwrap();

    assert_eq!(outcome, WaitOutcome::Ready(1));
    assert_eq!(quiet.waiter_count(), 0);
    assert_eq!(loud.waiter_count(), 0);
}

#[test]
fn test_concurrent_waiters_all_observe_release() {
    let k = Arc::new(kernel());
    let sem = k.registry().create_semaphore(0);
    let waiters = 4;
    let barrier = Arc::new(Barrier::new(waiters + 1));

    let handles: Vec<_> = (0..waiters)
        .map(|i| {
            let k = Arc::clone(&k);
            let barrier = Arc::clone(&barrier);
            let id = sem.id();
            thread::spawn(move || {
                barrier.wait();
                let mut descs = [WaitDescriptor::semaphore(id)];
                k.wait_for_objects(i as u32 + 1, &mut descs, WaitFlags::RELATIVE_TIMEOUT, 5_000_000)
            })
        })
        .collect();

    barrier.wait();
    thread::sleep(Duration::from_millis(50));
    sem.release(1).unwrap();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(WaitOutcome::Ready(1)));
    }
    assert_eq!(sem.waiter_count(), 0);
    assert_eq!(k.stats().snapshot().ready, waiters as u64);
}

#[test]
fn test_object_removed_from_registry_during_wait() {
    let k = kernel();
    let port = k.registry().create_port(4);
    let registry = k.registry().clone();
    let id = port.id();

    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        registry.delete_port(id).unwrap();
    });

    let mut descs = [WaitDescriptor::port(id, WaitEvents::READ)];
    let outcome = k
        .wait_for_objects(1, &mut descs, WaitFlags::RELATIVE_TIMEOUT, 5_000_000)
        .unwrap();
    handle.join().unwrap();

    assert_eq!(outcome, WaitOutcome::Ready(1));
    assert_eq!(descs[0].result_events, WaitEvents::INVALID);
    assert_eq!(port.waiter_count(), 0);

    // The next call no longer resolves the object
    let mut descs = [WaitDescriptor::port(id, WaitEvents::READ)];
    assert!(k
        .wait_for_objects(1, &mut descs, WaitFlags::RELATIVE_TIMEOUT, 0)
        .is_err());
}
