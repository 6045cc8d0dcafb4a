/*!
 * Listener Registry
 * Subscriber list guarded by a narrow lock, notified from a snapshot
 */

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::error;

/// Handle returned on registration, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Shared callback type
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Ordered set of callbacks for events of type `E`
///
/// The lock only covers registration and snapshotting. Callbacks run
/// outside of it, so a callback may add or remove listeners (including
/// itself) without deadlocking; such changes apply from the next notify.
pub struct ListenerRegistry<E> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(ListenerId, Listener<E>)>>,
}

impl<E> ListenerRegistry<E> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Register a callback; it is invoked after every listener registered before it
    pub fn add<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, Arc::new(listener)));
        id
    }

    /// Unregister a callback. Returns false if the id is unknown.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.lock();
        match entries.iter().position(|(entry_id, _)| *entry_id == id) {
            Some(pos) => {
                entries.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copy of the current callbacks in registration order
    pub fn snapshot(&self) -> Vec<Listener<E>> {
        self.entries
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    /// Invoke every registered callback with `event`
    ///
    /// A panicking callback is logged and skipped; the rest still run.
    /// Returns the number of callbacks that panicked.
    pub fn notify(&self, event: &E) -> usize {
        let mut failures = 0;
        for listener in self.snapshot() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                failures += 1;
                error!(reason = %panic_message(payload.as_ref()), "Listener panicked during notification");
            }
        }
        failures
    }
}

impl<E> Default for ListenerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ListenerRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("len", &self.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_notify_in_registration_order() {
        let registry = ListenerRegistry::<u64>::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let log = Arc::clone(&log);
            registry.add(move |t: &u64| log.lock().push(format!("{}{}", tag, t)));
        }

        assert_eq!(registry.notify(&7), 0);
        assert_eq!(*log.lock(), vec!["a7", "b7", "c7"]);
    }

    #[test]
    fn test_remove() {
        let registry = ListenerRegistry::<u64>::new();
        let id = registry.add(|_| {});
        assert_eq!(registry.len(), 1);
        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_panicking_listener_does_not_stop_others() {
        crate::monitoring::init_test_tracing();
        let registry = ListenerRegistry::<u64>::new();
        let hits = Arc::new(AtomicUsize::new(0));

        registry.add(|_| panic!("boom"));
        let counter = Arc::clone(&hits);
        registry.add(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(registry.notify(&0), 1);
        assert_eq!(registry.notify(&1), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listener_may_mutate_registry() {
        let registry = Arc::new(ListenerRegistry::<u64>::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let reg = Arc::clone(&registry);
        let counter = Arc::clone(&hits);
        registry.add(move |_| {
            let counter = Arc::clone(&counter);
            reg.add(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        });

        // The listener added during the first notify is not part of that snapshot
        registry.notify(&0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(registry.len(), 2);

        registry.notify(&1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
