/*!
 * Timeout Tests
 *
 * Relative, absolute and zero timeouts. Serialized so wall-clock
 * assertions are not skewed by other blocked tests.
 */

use objwait_kernel::core::limits::INFINITE_TIMEOUT;
use objwait_kernel::core::time::system_time;
use objwait_kernel::wait::Waitable;
use objwait_kernel::{
    ObjectWaitSyscalls, WaitConfig, WaitDescriptor, WaitError, WaitFlags, WaitOutcome,
};
use serial_test::serial;
use std::time::{Duration, Instant};

fn kernel() -> ObjectWaitSyscalls {
    ObjectWaitSyscalls::with_config(WaitConfig::long_wait())
}

#[test]
#[serial]
fn test_relative_timeout_elapses() {
    let k = kernel();
    let sem = k.registry().create_semaphore(0);

    let mut descs = [WaitDescriptor::semaphore(sem.id())];
    let start = Instant::now();
    let outcome = k
        .wait_for_objects(1, &mut descs, WaitFlags::RELATIVE_TIMEOUT, 50_000)
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(outcome, WaitOutcome::TimedOut);
    assert!(elapsed >= Duration::from_millis(50), "woke early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "woke late: {elapsed:?}");
    assert!(descs[0].result_events.is_empty());
    assert_eq!(sem.waiter_count(), 0);
}

#[test]
#[serial]
fn test_absolute_timeout_elapses() {
    let k = kernel();
    let port = k.registry().create_port(2);

    let deadline = system_time() + 40_000;
    let mut descs = [WaitDescriptor::port(port.id(), objwait_kernel::WaitEvents::READ)];
    let outcome = k
        .wait_for_objects(1, &mut descs, WaitFlags::ABSOLUTE_TIMEOUT, deadline)
        .unwrap();

    assert_eq!(outcome, WaitOutcome::TimedOut);
    assert!(system_time() >= deadline);
    assert_eq!(port.waiter_count(), 0);
}

#[test]
#[serial]
fn test_past_absolute_deadline_polls() {
    let k = kernel();
    let sem = k.registry().create_semaphore(0);

    let mut descs = [WaitDescriptor::semaphore(sem.id())];
    let start = Instant::now();
    let outcome = k
        .wait_for_objects(1, &mut descs, WaitFlags::ABSOLUTE_TIMEOUT, 0)
        .unwrap();

    assert_eq!(outcome, WaitOutcome::TimedOut);
    assert!(start.elapsed() < Duration::from_millis(500));
    assert_eq!(sem.waiter_count(), 0);
}

#[test]
#[serial]
fn test_zero_relative_timeout_polls() {
    let k = kernel();
    let idle = k.registry().create_semaphore(0);
    let ready = k.registry().create_semaphore(1);

    let mut descs = [WaitDescriptor::semaphore(idle.id())];
    let start = Instant::now();
    assert_eq!(
        k.wait_for_objects(1, &mut descs, WaitFlags::RELATIVE_TIMEOUT, 0)
            .unwrap(),
        WaitOutcome::TimedOut
    );
    assert!(start.elapsed() < Duration::from_millis(500));

    let mut descs = [
        WaitDescriptor::semaphore(idle.id()),
        WaitDescriptor::semaphore(ready.id()),
    ];
    assert_eq!(
        k.wait_for_objects(1, &mut descs, WaitFlags::RELATIVE_TIMEOUT, -5)
            .unwrap(),
        WaitOutcome::Ready(1)
    );
    assert_eq!(idle.waiter_count(), 0);
    assert_eq!(ready.waiter_count(), 0);
}

#[test]
#[serial]
fn test_infinite_value_never_expires() {
    let k = kernel();
    let sem = k.registry().create_semaphore(0);
    let releaser = sem.clone();

    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(80));
        releaser.release(1).unwrap();
    });

    // INFINITE_TIMEOUT overrides the relative flag
    let mut descs = [WaitDescriptor::semaphore(sem.id())];
    let outcome = k
        .wait_for_objects(1, &mut descs, WaitFlags::RELATIVE_TIMEOUT, INFINITE_TIMEOUT)
        .unwrap();
    handle.join().unwrap();

    assert_eq!(outcome, WaitOutcome::Ready(1));
}

#[test]
#[serial]
fn test_conflicting_timeout_flags_rejected() {
    let k = kernel();
    let sem = k.registry().create_semaphore(1);

    let mut descs = [WaitDescriptor::semaphore(sem.id())];
    let err = k
        .wait_for_objects(
            1,
            &mut descs,
            WaitFlags::RELATIVE_TIMEOUT | WaitFlags::ABSOLUTE_TIMEOUT,
            1_000,
        )
        .unwrap_err();

    assert!(matches!(err, WaitError::InvalidArgument(_)));
    assert_eq!(sem.waiter_count(), 0);
}
