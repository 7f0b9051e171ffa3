/*!
 * Lost Wakeup Tests
 *
 * A state change racing the enrollment phase must never be missed,
 * whatever the interleaving.
 */

use objwait_kernel::wait::Waitable;
use objwait_kernel::{
    ObjectWaitSyscalls, WaitConfig, WaitDescriptor, WaitEvents, WaitFlags, WaitOutcome,
};
use proptest::prelude::*;
use std::thread;
use std::time::Duration;

fn kernel(spin: bool) -> ObjectWaitSyscalls {
    let config = if spin {
        WaitConfig::low_latency()
    } else {
        WaitConfig::long_wait()
    };
    ObjectWaitSyscalls::with_config(config)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_signal_during_enroll_is_observed(
        objects in 1usize..6,
        target_seed in any::<usize>(),
        delay_us in 0u64..400,
        spin in any::<bool>(),
        use_port in any::<bool>(),
    ) {
        let k = kernel(spin);
        let target = target_seed % objects;

        let sems: Vec<_> = (0..objects).map(|_| k.registry().create_semaphore(0)).collect();
        let port = k.registry().create_port(4);

        let firing_sem = sems[target].clone();
        let firing_port = port.clone();
        let producer = thread::spawn(move || {
            if delay_us > 0 {
                thread::sleep(Duration::from_micros(delay_us));
            }
            if use_port {
                firing_port.write(1, vec![0]).unwrap();
            } else {
                firing_sem.release(1).unwrap();
            }
        });

        let mut descs: Vec<_> = sems.iter().map(|s| WaitDescriptor::semaphore(s.id())).collect();
        descs.push(WaitDescriptor::port(port.id(), WaitEvents::READ));

        // Generous timeout: a lost wakeup shows up as TimedOut
        let outcome = k
            .wait_for_objects(1, &mut descs, WaitFlags::RELATIVE_TIMEOUT, 5_000_000)
            .unwrap();
        producer.join().unwrap();

        prop_assert_eq!(outcome, WaitOutcome::Ready(1));
        if use_port {
            prop_assert!(descs[objects].result_events.contains(WaitEvents::READ));
        } else {
            prop_assert_eq!(descs[target].result_events, WaitEvents::READ);
        }
        for sem in &sems {
            prop_assert_eq!(sem.waiter_count(), 0);
        }
        prop_assert_eq!(port.waiter_count(), 0);
    }
}
