//! Observable single-value cell
//!
//! [`ValueCell`] holds one value that can be read synchronously and watched
//! for changes. `update` stores the new value and then calls every
//! subscriber, in subscription order, before returning. Subscribers only see
//! updates made after they subscribed; nothing is buffered or replayed.
//!
//! Concurrent updates are applied one at a time, store and notify together,
//! so the last value a subscriber sees is the cell's current value. A
//! callback may read the cell but must not update it.
//!
//! # Example
//! ```
//! use hdkeyring_entries::value::ValueCell;
//! use std::sync::{Arc, Mutex};
//!
//! let cell = ValueCell::new(1);
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! cell.subscribe(move |v| sink.lock().unwrap().push(*v));
//!
//! cell.update(2);
//! assert_eq!(cell.value(), 2);
//! assert_eq!(*seen.lock().unwrap(), vec![2]);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle returned by [`ValueCell::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct ValueCell<T> {
    value: RwLock<T>,
    subscribers: Mutex<Vec<(SubscriptionId, Callback<T>)>>,
    next_id: AtomicU64,
    updating: Mutex<()>,
}

impl<T: Clone> ValueCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            value: RwLock::new(initial),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            updating: Mutex::new(()),
        }
    }

    /// Current value
    pub fn value(&self) -> T {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Register `callback` for future updates
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        id
    }

    /// Stop notifying `id`. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    /// Store `value` and notify subscribers synchronously
    pub fn update(&self, value: T) {
        let _updating = self.updating.lock().unwrap_or_else(PoisonError::into_inner);
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = value.clone();

        // Callbacks run without the value lock held so they may read the cell
        let subscribers: Vec<Callback<T>> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in subscribers {
            callback(&value);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for ValueCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueCell")
            .field("value", &self.value())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Arc<Mutex<Vec<String>>>;

    fn push_to(log: &Log, name: &str) -> impl Fn(&Option<String>) + Send + Sync + 'static {
        let log = log.clone();
        let name = name.to_string();
        move |v| {
            log.lock()
                .unwrap()
                .push(format!("{}:{}", name, v.as_deref().unwrap_or("-")));
        }
    }

    #[test]
    fn test_initial_value() {
        let cell = ValueCell::new(Some("start".to_string()));
        assert_eq!(cell.value(), Some("start".to_string()));
    }

    #[test]
    fn test_notifies_in_subscription_order() {
        let cell: ValueCell<Option<String>> = ValueCell::new(None);
        let log = Log::default();

        cell.subscribe(push_to(&log, "a"));
        cell.subscribe(push_to(&log, "b"));

        cell.update(Some("x".into()));
        cell.update(None);

        assert_eq!(*log.lock().unwrap(), vec!["a:x", "b:x", "a:-", "b:-"]);
    }

    #[test]
    fn test_late_subscriber_gets_no_replay() {
        let cell: ValueCell<Option<String>> = ValueCell::new(None);
        let log = Log::default();

        cell.update(Some("early".into()));
        cell.subscribe(push_to(&log, "late"));
        assert!(log.lock().unwrap().is_empty());

        cell.update(Some("later".into()));
        assert_eq!(*log.lock().unwrap(), vec!["late:later"]);
    }

    #[test]
    fn test_unsubscribe() {
        let cell: ValueCell<Option<String>> = ValueCell::new(None);
        let log = Log::default();

        let id = cell.subscribe(push_to(&log, "a"));
        assert_eq!(cell.subscriber_count(), 1);
        assert!(cell.unsubscribe(id));
        assert!(!cell.unsubscribe(id));

        cell.update(Some("x".into()));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(cell.value(), Some("x".to_string()));
    }

    #[test]
    fn test_concurrent_updates_notify_in_write_order() {
        let cell = Arc::new(ValueCell::new(0u32));
        let last_seen = Arc::new(Mutex::new(0u32));
        let sink = last_seen.clone();
        cell.subscribe(move |v| *sink.lock().unwrap() = *v);

        let handles: Vec<_> = (1..=8u32)
            .map(|t| {
                let cell = Arc::clone(&cell);
                std::thread::spawn(move || {
                    for i in 0..200 {
                        cell.update(t * 1000 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*last_seen.lock().unwrap(), cell.value());
    }

    #[test]
    fn test_callback_can_read_cell() {
        let cell = Arc::new(ValueCell::new(0u32));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let reader = Arc::downgrade(&cell);
        let sink = seen.clone();
        cell.subscribe(move |v| {
            let current = reader.upgrade().map(|c| c.value());
            sink.lock().unwrap().push((*v, current));
        });

        cell.update(5);
        assert_eq!(*seen.lock().unwrap(), vec![(5, Some(5))]);
    }
}
