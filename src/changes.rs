//! Storage-change notifications, broadcast to every subscriber.

use crate::models::Scope;
use log::warn;
use serde_json::Value;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub scope: Scope,
    pub key: &'static str,
    pub new_value: Value,
}

#[derive(Default)]
pub struct ChangeHub {
    subscribers: Mutex<Vec<Sender<StorageChange>>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<StorageChange> {
        let (tx, rx) = channel();
        self.lock().push(tx);
        rx
    }

    /// Send to all live subscribers, dropping the ones that hung up.
    pub fn publish(&self, change: &StorageChange) {
        self.lock().retain(|tx| tx.send(change.clone()).is_ok());
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<StorageChange>>> {
        match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("ChangeHub: subscriber mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn change(key: &'static str, value: Value) -> StorageChange {
        StorageChange { scope: Scope::Local, key, new_value: value }
    }

    #[test]
    fn test_every_subscriber_receives() {
        let hub = ChangeHub::new();
        let a = hub.subscribe();
        let b = hub.subscribe();

        hub.publish(&change("isBlocking", json!(true)));

        assert_eq!(a.try_recv().unwrap().new_value, json!(true));
        assert_eq!(b.try_recv().unwrap().key, "isBlocking");
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let hub = ChangeHub::new();
        let kept = hub.subscribe();
        drop(hub.subscribe());
        assert_eq!(hub.subscriber_count(), 2);

        hub.publish(&change("blockedCount", json!(1)));

        assert_eq!(hub.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }
}
