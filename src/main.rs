/*!
 * Object Wait Kernel - Demo Entry Point
 *
 * Boots the object subsystems and runs a few multiplexed waits:
 * - a blocked wait woken by a producer thread
 * - a poll that reports an invalid descriptor
 * - an interruptible wait aborted by a signal
 */

use anyhow::{Context, Result};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use objwait_kernel::{
    init_tracing, ObjectWaitSyscalls, Signal, WaitConfig, WaitDescriptor, WaitError, WaitEvents,
    WaitFlags, WaitOutcome,
};

const MAIN_TID: u32 = 1;
const PRODUCER_TID: u32 = 2;

fn main() -> Result<()> {
    init_tracing();

    info!("Object wait kernel starting...");
    info!("================================================");

    let config = WaitConfig::from_env();
    info!(
        max_objects = config.max_objects,
        strategy = ?config.sync.strategy,
        "Wait configuration loaded"
    );
    let kernel = Arc::new(ObjectWaitSyscalls::with_config(config));

    let registry = kernel.registry();
    let sem = registry.create_semaphore(0);
    let port = registry.create_default_port();
    let fd = registry.open_default_descriptor();
    let worker = registry.spawn_thread("producer");
    info!(
        semaphore = sem.id(),
        port = port.id(),
        fd = fd.id(),
        thread = worker.id(),
        "Objects created"
    );

    // Blocked wait, woken by the producer
    let producer = {
        let port = Arc::clone(&port);
        let fd = Arc::clone(&fd);
        thread::Builder::new()
            .name("producer".into())
            .spawn(move || -> Result<()> {
                thread::sleep(Duration::from_millis(20));
                port.write(7, b"hello".to_vec())?;
                fd.write(b"bytes")?;
                Ok(())
            })
            .context("spawn producer")?
    };

    let mut descriptors = [
        WaitDescriptor::semaphore(sem.id()),
        WaitDescriptor::port(port.id(), WaitEvents::READ),
        WaitDescriptor::thread(worker.id()),
    ];
    let outcome = kernel.wait_for_objects(
        MAIN_TID,
        &mut descriptors,
        WaitFlags::RELATIVE_TIMEOUT,
        1_000_000,
    )?;
    report("blocked wait", outcome, &descriptors);

    producer
        .join()
        .map_err(|_| anyhow::anyhow!("producer panicked"))??;
    let message = port.read()?;
    info!(code = message.code, len = message.data.len(), "Port message received");

    // Poll with one stale descriptor
    registry.exit_thread(worker.id(), 0)?;
    let mut descriptors = [
        WaitDescriptor::descriptor(fd.id(), WaitEvents::READ),
        WaitDescriptor::port(9_999, WaitEvents::READ),
        WaitDescriptor::thread(worker.id()),
    ];
    let outcome =
        kernel.wait_for_objects(MAIN_TID, &mut descriptors, WaitFlags::RELATIVE_TIMEOUT, 0)?;
    report("poll", outcome, &descriptors);

    // Interruptible wait aborted by a signal
    let signals = kernel.signals().clone();
    let sender = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        signals.send(PRODUCER_TID, MAIN_TID, Signal::SIGUSR1)
    });
    let mut descriptors = [WaitDescriptor::semaphore(sem.id())];
    match kernel.wait_for_objects(
        MAIN_TID,
        &mut descriptors,
        WaitFlags::INTERRUPTIBLE | WaitFlags::RELATIVE_TIMEOUT,
        1_000_000,
    ) {
        Err(WaitError::Interrupted) => info!("Interruptible wait aborted by signal"),
        other => warn!(result = ?other, "Interruptible wait was not interrupted"),
    }
    sender
        .join()
        .map_err(|_| anyhow::anyhow!("signal sender panicked"))??;
    let delivered = kernel.signals().take_pending(MAIN_TID);
    info!(count = delivered.len(), "Pending signals consumed");

    let stats = serde_json::to_string_pretty(&kernel.stats().snapshot())?;
    println!("{stats}");

    info!("Object wait kernel finished");
    Ok(())
}

fn report(label: &str, outcome: WaitOutcome, descriptors: &[WaitDescriptor]) {
    info!(label, outcome = ?outcome, "Wait returned");
    for (index, d) in descriptors.iter().enumerate() {
        info!(
            index,
            object_type = %d.object_type,
            object_id = d.object_id,
            status = ?d.status,
            events = ?d.result_events,
            "descriptor"
        );
    }
}
