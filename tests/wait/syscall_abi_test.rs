/*!
 * Raw Syscall ABI Tests
 *
 * Return codes and written-back entries of `sys_wait_for_objects`
 */

use objwait_kernel::core::limits::INFINITE_TIMEOUT;
use objwait_kernel::{
    ObjectType, ObjectWaitSyscalls, RawWaitInfo, Signal, WaitConfig, WaitEvents, WaitFlags,
};
use std::thread;
use std::time::Duration;

fn kernel() -> ObjectWaitSyscalls {
    ObjectWaitSyscalls::with_config(WaitConfig::long_wait().with_max_objects(4))
}

#[test]
fn test_raw_entry_layout() {
    assert_eq!(std::mem::size_of::<RawWaitInfo>(), 8);
    assert_eq!(std::mem::align_of::<RawWaitInfo>(), 4);
}

#[test]
fn test_ready_count_returned() {
    let k = kernel();
    let a = k.registry().create_semaphore(1);
    let b = k.registry().create_semaphore(3);

    let mut infos = [
        RawWaitInfo::new(ObjectType::Semaphore, a.id(), WaitEvents::ACQUIRE_SEMAPHORE),
        RawWaitInfo::new(ObjectType::Semaphore, b.id(), WaitEvents::ACQUIRE_SEMAPHORE),
    ];
    assert_eq!(k.sys_wait_for_objects(1, &mut infos, 0, INFINITE_TIMEOUT), 2);
    assert!(infos.iter().all(|i| i.events == WaitEvents::READ.bits()));
}

#[test]
fn test_timeout_returns_zero() {
    let k = kernel();
    let port = k.registry().create_port(1);

    let mut infos = [RawWaitInfo::new(ObjectType::Port, port.id(), WaitEvents::READ)];
    let ret = k.sys_wait_for_objects(1, &mut infos, WaitFlags::RELATIVE_TIMEOUT.bits(), 5_000);
    assert_eq!(ret, 0);
    assert_eq!(infos[0].events, 0);
}

#[test]
fn test_invalid_arguments() {
    let k = kernel();
    let sem = k.registry().create_semaphore(1);
    let valid = RawWaitInfo::new(ObjectType::Semaphore, sem.id(), WaitEvents::READ);

    // Too many entries
    let mut infos = [valid; 5];
    assert_eq!(k.sys_wait_for_objects(1, &mut infos, 0, 0), -22);

    // Unknown flag bits
    let mut infos = [valid];
    assert_eq!(k.sys_wait_for_objects(1, &mut infos, 0x40, 0), -22);

    // Both timeout kinds
    let mut infos = [valid];
    let both = (WaitFlags::RELATIVE_TIMEOUT | WaitFlags::ABSOLUTE_TIMEOUT).bits();
    assert_eq!(k.sys_wait_for_objects(1, &mut infos, both, 0), -22);
}

#[test]
fn test_unknown_type_marks_only_that_entry() {
    let k = kernel();
    let sem = k.registry().create_semaphore(1);
    let port = k.registry().create_port(2);

    let mut infos = [
        RawWaitInfo::new(ObjectType::Semaphore, sem.id(), WaitEvents::READ),
        RawWaitInfo {
            object: 5,
            object_type: 42,
            events: WaitEvents::READ.bits(),
        },
        RawWaitInfo::new(ObjectType::Port, port.id(), WaitEvents::READ),
    ];
    assert_eq!(k.sys_wait_for_objects(1, &mut infos, 0, 0), 1);

    assert_eq!(infos[0].events, WaitEvents::READ.bits());
    assert_eq!(infos[1].events, WaitEvents::INVALID.bits());
    assert_eq!(infos[2].events, 0);
    assert_eq!(infos[1].object_type, 42);
}

#[test]
fn test_unknown_types_only_is_no_valid_targets() {
    let k = kernel();
    let mut infos = [
        RawWaitInfo {
            object: 1,
            object_type: 42,
            events: WaitEvents::READ.bits(),
        },
        RawWaitInfo::new(ObjectType::Port, 777, WaitEvents::READ),
    ];
    assert_eq!(k.sys_wait_for_objects(1, &mut infos, 0, INFINITE_TIMEOUT), -9);
    assert!(infos.iter().all(|i| i.events == WaitEvents::INVALID.bits()));

    let mut infos = [RawWaitInfo {
        object: 1,
        object_type: 7,
        events: WaitEvents::READ.bits(),
    }];
    assert_eq!(k.sys_wait_for_objects(1, &mut infos, 0, 0), -9);
    assert_eq!(infos[0].events, WaitEvents::INVALID.bits());
}

#[test]
fn test_no_valid_targets_code() {
    let k = kernel();
    let mut infos = [
        RawWaitInfo::new(ObjectType::Thread, 500, WaitEvents::empty()),
        RawWaitInfo::new(ObjectType::Descriptor, 501, WaitEvents::READ),
    ];
    assert_eq!(k.sys_wait_for_objects(1, &mut infos, 0, INFINITE_TIMEOUT), -9);
    assert!(infos.iter().all(|i| i.events == WaitEvents::INVALID.bits()));
}

#[test]
fn test_interrupted_code() {
    let k = kernel();
    let sem = k.registry().create_semaphore(0);
    let signals = k.signals().clone();

    let sender = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        signals.send(2, 1, Signal::SIGINT).unwrap();
    });

    let mut infos = [RawWaitInfo::new(ObjectType::Semaphore, sem.id(), WaitEvents::READ)];
    let ret = k.sys_wait_for_objects(1, &mut infos, WaitFlags::INTERRUPTIBLE.bits(), INFINITE_TIMEOUT);
    sender.join().unwrap();

    assert_eq!(ret, -4);
    assert_eq!(k.stats().snapshot().interrupts, 1);
}
