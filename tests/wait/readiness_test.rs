/*!
 * Readiness Tests
 *
 * Immediate readiness, wakeups from other threads, partial validity and
 * the event sources of each object kind.
 */

use objwait_kernel::core::limits::INFINITE_TIMEOUT;
use objwait_kernel::wait::{DescriptorStatus, Waitable};
use objwait_kernel::{
    ObjectWaitSyscalls, WaitConfig, WaitDescriptor, WaitError, WaitEvents, WaitFlags, WaitOutcome,
};
use pretty_assertions::assert_eq;
use std::thread;
use std::time::{Duration, Instant};

fn kernel() -> ObjectWaitSyscalls {
    ObjectWaitSyscalls::with_config(WaitConfig::long_wait())
}

#[test]
fn test_ready_object_returns_without_blocking() {
    let k = kernel();
    let sem = k.registry().create_semaphore(1);

    let mut descs = [WaitDescriptor::semaphore(sem.id())];
    let start = Instant::now();
    let outcome = k
        .wait_for_objects(1, &mut descs, WaitFlags::empty(), INFINITE_TIMEOUT)
        .unwrap();

    assert_eq!(outcome, WaitOutcome::Ready(1));
    assert_eq!(descs[0].result_events, WaitEvents::READ);
    assert_eq!(descs[0].status, DescriptorStatus::Ok);
    assert!(start.elapsed() < Duration::from_millis(500));
    assert_eq!(sem.waiter_count(), 0);
    // Readiness is observed, never consumed
    assert_eq!(sem.count(), 1);
}

#[test]
fn test_all_ready_descriptors_reported() {
    let k = kernel();
    let sem = k.registry().create_semaphore(2);
    let port = k.registry().create_port(4);
    port.write(1, vec![1]).unwrap();
    let idle = k.registry().create_semaphore(0);

    let mut descs = [
        WaitDescriptor::semaphore(sem.id()),
        WaitDescriptor::semaphore(idle.id()),
        WaitDescriptor::port(port.id(), WaitEvents::READ),
    ];
    let outcome = k
        .wait_for_objects(1, &mut descs, WaitFlags::empty(), INFINITE_TIMEOUT)
        .unwrap();

    assert_eq!(outcome, WaitOutcome::Ready(2));
    assert!(descs[0].is_ready());
    assert!(!descs[1].is_ready());
    assert!(descs[2].result_events.contains(WaitEvents::READ));
}

#[test]
fn test_single_shot_keeps_first_ready() {
    let k = kernel();
    let a = k.registry().create_semaphore(1);
    let b = k.registry().create_semaphore(1);

    let mut descs = [
        WaitDescriptor::semaphore(a.id()),
        WaitDescriptor::semaphore(b.id()),
    ];
    let outcome = k
        .wait_for_objects(1, &mut descs, WaitFlags::SINGLE_SHOT, INFINITE_TIMEOUT)
        .unwrap();

    assert_eq!(outcome, WaitOutcome::Ready(1));
    assert!(descs[0].is_ready());
    assert!(descs[1].result_events.is_empty());
}

#[test]
fn test_blocked_wait_woken_by_release() {
    let k = kernel();
    let sem = k.registry().create_semaphore(0);
    let waker = sem.clone();

    let releaser = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        waker.release(1).unwrap();
    });

    let mut descs = [WaitDescriptor::semaphore(sem.id())];
    let start = Instant::now();
    let outcome = k
        .wait_for_objects(1, &mut descs, WaitFlags::empty(), INFINITE_TIMEOUT)
        .unwrap();
    releaser.join().unwrap();

    assert_eq!(outcome, WaitOutcome::Ready(1));
    assert_eq!(descs[0].result_events, WaitEvents::READ);
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(sem.waiter_count(), 0);
}

#[test]
fn test_partial_validity() {
    let k = kernel();
    let sem = k.registry().create_semaphore(0);
    let port = k.registry().create_port(4);
    let writer = port.clone();

    let producer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        writer.write(3, b"ping".to_vec()).unwrap();
    });

    let mut descs = [
        WaitDescriptor::semaphore(sem.id()),
        WaitDescriptor::port(4_242, WaitEvents::READ),
        WaitDescriptor::port(port.id(), WaitEvents::READ),
    ];
    let outcome = k
        .wait_for_objects(1, &mut descs, WaitFlags::RELATIVE_TIMEOUT, 2_000_000)
        .unwrap();
    producer.join().unwrap();

    assert_eq!(outcome, WaitOutcome::Ready(1));
    assert_eq!(descs[0].status, DescriptorStatus::Ok);
    assert!(descs[0].result_events.is_empty());
    assert_eq!(descs[1].status, DescriptorStatus::InvalidObject);
    assert!(descs[1].result_events.is_empty());
    assert!(descs[2].result_events.contains(WaitEvents::READ));
    assert_eq!(sem.waiter_count(), 0);
    assert_eq!(port.waiter_count(), 0);
}

#[test]
fn test_no_valid_targets() {
    let k = kernel();
    let mut descs = [
        WaitDescriptor::semaphore(100),
        WaitDescriptor::thread(200),
    ];
    let err = k
        .wait_for_objects(1, &mut descs, WaitFlags::empty(), INFINITE_TIMEOUT)
        .unwrap_err();

    assert_eq!(err, WaitError::NoValidTargets(2));
    assert!(descs.iter().all(|d| d.status == DescriptorStatus::InvalidObject));
}

#[test]
fn test_thread_exit_reports_invalid() {
    let k = kernel();
    let worker = k.registry().spawn_thread("worker");
    let registry = k.registry().clone();
    let id = worker.id();

    let exiter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        registry.exit_thread(id, 3).unwrap();
    });

    let mut descs = [WaitDescriptor::thread(id)];
    let outcome = k
        .wait_for_objects(1, &mut descs, WaitFlags::empty(), INFINITE_TIMEOUT)
        .unwrap();
    exiter.join().unwrap();

    assert_eq!(outcome, WaitOutcome::Ready(1));
    assert!(descs[0].result_events.contains(WaitEvents::INVALID));
    assert_eq!(worker.exit_status(), Some(3));
}

#[test]
fn test_descriptor_events() {
    let k = kernel();
    let fd = k.registry().open_descriptor(16);
    let writer = fd.clone();

    let hangup = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        writer.hang_up();
    });

    // Interest in READ only; disconnect is always reported
    let mut descs = [WaitDescriptor::descriptor(fd.id(), WaitEvents::READ)];
    let outcome = k
        .wait_for_objects(1, &mut descs, WaitFlags::empty(), INFINITE_TIMEOUT)
        .unwrap();
    hangup.join().unwrap();

    assert_eq!(outcome, WaitOutcome::Ready(1));
    assert!(descs[0].result_events.contains(WaitEvents::DISCONNECTED));
    assert!(!descs[0].result_events.contains(WaitEvents::WRITE));
}

#[test]
fn test_deleted_semaphore_wakes_waiter() {
    let k = kernel();
    let sem = k.registry().create_semaphore(0);
    let registry = k.registry().clone();
    let id = sem.id();

    let deleter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        registry.delete_semaphore(id).unwrap();
    });

    let mut descs = [WaitDescriptor::semaphore(id)];
    let outcome = k
        .wait_for_objects(1, &mut descs, WaitFlags::empty(), INFINITE_TIMEOUT)
        .unwrap();
    deleter.join().unwrap();

    assert_eq!(outcome, WaitOutcome::Ready(1));
    assert_eq!(descs[0].result_events, WaitEvents::INVALID);
}
