/*!
 * Object Registry
 *
 * Per-kind object tables and the resolver the multiplexer consults.
 * Passed explicitly to the wait core; there is no global table.
 *
 * Lookups clone the object's `Arc` while the table shard is read-locked,
 * so a resolved target stays valid through enrollment even if the object
 * is deleted concurrently.
 */

use super::{Descriptor, Port, Semaphore, ThreadObject};
use crate::core::errors::{ObjectError, ObjectResult};
use crate::core::limits::{DEFAULT_DESCRIPTOR_BUFFER, DEFAULT_PORT_CAPACITY};
use crate::core::types::ObjectId;
use crate::wait::{ObjectType, WaitTarget, WaitTargetResolver};
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

type Table<T> = DashMap<ObjectId, Arc<T>, RandomState>;

fn table<T>() -> Table<T> {
    DashMap::with_hasher(RandomState::new())
}

/// Kernel object tables
pub struct ObjectRegistry {
    semaphores: Table<Semaphore>,
    ports: Table<Port>,
    threads: Table<ThreadObject>,
    descriptors: Table<Descriptor>,
    next_semaphore: AtomicI32,
    next_port: AtomicI32,
    next_thread: AtomicI32,
    next_descriptor: AtomicI32,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        info!("Object registry initialized");
        Self {
            semaphores: table(),
            ports: table(),
            threads: table(),
            descriptors: table(),
            next_semaphore: AtomicI32::new(1),
            next_port: AtomicI32::new(1),
            next_thread: AtomicI32::new(1),
            // 0-2 are conventionally the standard streams
            next_descriptor: AtomicI32::new(3),
        }
    }

    #[inline]
    fn allocate(counter: &AtomicI32) -> ObjectId {
        counter.fetch_add(1, Ordering::Relaxed)
    }

    // =========================================================================
    // Semaphores
    // =========================================================================

    pub fn create_semaphore(&self, count: i32) -> Arc<Semaphore> {
        let id = Self::allocate(&self.next_semaphore);
        let sem = Arc::new(Semaphore::new(id, count));
        self.semaphores.insert(id, sem.clone());
        debug!(id, count, "semaphore created");
        sem
    }

    pub fn semaphore(&self, id: ObjectId) -> Option<Arc<Semaphore>> {
        self.semaphores.get(&id).map(|e| e.value().clone())
    }

    /// Remove from the table and wake waiters with INVALID
    pub fn delete_semaphore(&self, id: ObjectId) -> ObjectResult<()> {
        let (_, sem) = self
            .semaphores
            .remove(&id)
            .ok_or(ObjectError::NotFound(id))?;
        sem.delete();
        debug!(id, "semaphore deleted");
        Ok(())
    }

    // =========================================================================
    // Ports
    // =========================================================================

    pub fn create_port(&self, capacity: usize) -> Arc<Port> {
        let id = Self::allocate(&self.next_port);
        let port = Arc::new(Port::new(id, capacity));
        self.ports.insert(id, port.clone());
        debug!(id, capacity, "port created");
        port
    }

    pub fn create_default_port(&self) -> Arc<Port> {
        self.create_port(DEFAULT_PORT_CAPACITY)
    }

    pub fn port(&self, id: ObjectId) -> Option<Arc<Port>> {
        self.ports.get(&id).map(|e| e.value().clone())
    }

    pub fn delete_port(&self, id: ObjectId) -> ObjectResult<()> {
        let (_, port) = self.ports.remove(&id).ok_or(ObjectError::NotFound(id))?;
        port.close();
        debug!(id, "port deleted");
        Ok(())
    }

    // =========================================================================
    // Threads
    // =========================================================================

    pub fn spawn_thread(&self, name: impl Into<String>) -> Arc<ThreadObject> {
        let id = Self::allocate(&self.next_thread);
        let thread = Arc::new(ThreadObject::new(id, name));
        self.threads.insert(id, thread.clone());
        debug!(id, name = thread.name(), "thread registered");
        thread
    }

    pub fn thread(&self, id: ObjectId) -> Option<Arc<ThreadObject>> {
        self.threads.get(&id).map(|e| e.value().clone())
    }

    /// Mark a thread exited; its record stays until reaped
    pub fn exit_thread(&self, id: ObjectId, status: i32) -> ObjectResult<()> {
        let thread = self.thread(id).ok_or(ObjectError::NotFound(id))?;
        if !thread.exit(status) {
            return Err(ObjectError::Closed);
        }
        Ok(())
    }

    /// Remove an exited thread's record and return its status
    pub fn reap_thread(&self, id: ObjectId) -> ObjectResult<i32> {
        let thread = self.thread(id).ok_or(ObjectError::NotFound(id))?;
        let status = thread.exit_status().ok_or(ObjectError::WouldBlock)?;
        self.threads.remove(&id);
        Ok(status)
    }

    // =========================================================================
    // Descriptors
    // =========================================================================

    pub fn open_descriptor(&self, capacity: usize) -> Arc<Descriptor> {
        let fd = Self::allocate(&self.next_descriptor);
        let desc = Arc::new(Descriptor::new(fd, capacity));
        self.descriptors.insert(fd, desc.clone());
        debug!(fd, capacity, "descriptor opened");
        desc
    }

    pub fn open_default_descriptor(&self) -> Arc<Descriptor> {
        self.open_descriptor(DEFAULT_DESCRIPTOR_BUFFER)
    }

    pub fn descriptor(&self, fd: ObjectId) -> Option<Arc<Descriptor>> {
        self.descriptors.get(&fd).map(|e| e.value().clone())
    }

    pub fn close_descriptor(&self, fd: ObjectId) -> ObjectResult<()> {
        let (_, desc) = self
            .descriptors
            .remove(&fd)
            .ok_or(ObjectError::NotFound(fd))?;
        desc.close();
        debug!(fd, "descriptor closed");
        Ok(())
    }

    /// Total live objects across all tables
    pub fn object_count(&self) -> usize {
        self.semaphores.len() + self.ports.len() + self.threads.len() + self.descriptors.len()
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitTargetResolver for ObjectRegistry {
    fn resolve(&self, object_type: ObjectType, id: ObjectId) -> ObjectResult<WaitTarget> {
        let target = match object_type {
            ObjectType::Semaphore => self.semaphore(id).map(WaitTarget::Semaphore),
            ObjectType::Port => self.port(id).map(WaitTarget::Port),
            ObjectType::Thread => self.thread(id).map(WaitTarget::Thread),
            ObjectType::Descriptor => self.descriptor(id).map(WaitTarget::Descriptor),
        };
        target.ok_or(ObjectError::NotFound(id))
    }
}
