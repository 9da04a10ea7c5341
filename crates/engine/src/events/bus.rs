use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{trace, warn};

static HANDLERS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);
static QUEUE_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_lock_poison_once(flag: &AtomicBool, lock: &'static str, operation: &'static str) {
    if flag
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(lock, operation, "event bus lock poisoned; recovered inner value");
    }
}

type Handler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

struct QueuedEvent {
    type_id: TypeId,
    type_name: &'static str,
    payload: Box<dyn Any + Send>,
}

#[derive(Default)]
struct BusInner {
    handlers: RwLock<HashMap<TypeId, Vec<Handler>>>,
    queue: Mutex<Vec<QueuedEvent>>,
}

/// Typed publish/subscribe hub. Cloning yields another handle to the same bus.
///
/// `subscribe` and `queue` may be called from any thread. `publish` and `flush`
/// deliver on the calling thread and are meant for the update thread.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("event_types", &self.read_handlers("debug").len())
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of exactly type `T`. Handlers run in registration order.
    pub fn subscribe<T, F>(&self, handler: F)
    where
        T: Any,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let erased: Handler = Arc::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<T>() {
                handler(event);
            }
        });
        self.write_handlers("subscribe")
            .entry(TypeId::of::<T>())
            .or_default()
            .push(erased);
    }

    /// Delivers `event` synchronously to the current subscribers of `T`.
    /// Returns the number of handlers invoked.
    pub fn publish<T: Any>(&self, event: T) -> usize {
        self.dispatch(TypeId::of::<T>(), &event)
    }

    /// Defers `event` until the next [`EventBus::flush`].
    pub fn queue<T: Any + Send>(&self, event: T) {
        self.lock_queue("queue").push(QueuedEvent {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            payload: Box::new(event),
        });
    }

    /// Swaps out the pending list and delivers it in enqueue order. Events queued
    /// by handlers during the flush wait for the next one. Returns the number of
    /// events drained.
    pub fn flush(&self) -> usize {
        let drained = std::mem::take(&mut *self.lock_queue("flush"));
        let count = drained.len();
        for queued in drained {
            let delivered = self.dispatch(queued.type_id, queued.payload.as_ref());
            if delivered == 0 {
                trace!(event = queued.type_name, "queued_event_without_subscribers");
            }
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.lock_queue("pending_count").len()
    }

    pub fn subscriber_count<T: Any>(&self) -> usize {
        self.read_handlers("subscriber_count")
            .get(&TypeId::of::<T>())
            .map_or(0, Vec::len)
    }

    fn dispatch(&self, type_id: TypeId, event: &dyn Any) -> usize {
        // Snapshot so handlers may subscribe or queue without deadlocking.
        let handlers: Vec<Handler> = match self.read_handlers("dispatch").get(&type_id) {
            Some(handlers) => handlers.clone(),
            None => return 0,
        };
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    fn read_handlers(
        &self,
        operation: &'static str,
    ) -> RwLockReadGuard<'_, HashMap<TypeId, Vec<Handler>>> {
        match self.inner.handlers.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_lock_poison_once(&HANDLERS_LOCK_POISON_WARNED, "handlers", operation);
                poisoned.into_inner()
            }
        }
    }

    fn write_handlers(
        &self,
        operation: &'static str,
    ) -> RwLockWriteGuard<'_, HashMap<TypeId, Vec<Handler>>> {
        match self.inner.handlers.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_lock_poison_once(&HANDLERS_LOCK_POISON_WARNED, "handlers", operation);
                poisoned.into_inner()
            }
        }
    }

    fn lock_queue(&self, operation: &'static str) -> MutexGuard<'_, Vec<QueuedEvent>> {
        match self.inner.queue.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_lock_poison_once(&QUEUE_LOCK_POISON_WARNED, "queue", operation);
                poisoned.into_inner()
            }
        }
    }
}
