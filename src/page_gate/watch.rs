//! One "blocking state changed" stream for the page gate.
//!
//! Storage-change notifications and the fallback status poll both feed the
//! same stream; consumers only see a value when it differs from the last one.

use crate::changes::StorageChange;
use crate::constants::KEY_IS_BLOCKING;
use crate::coordinator::CoordinatorHandle;
use crate::models::Scope;
use log::warn;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

pub struct BlockingWatch {
    changes: Receiver<StorageChange>,
    coordinator: CoordinatorHandle,
    poll_interval: Duration,
    /// `None` once the interval no longer fits in an `Instant`.
    next_poll: Option<Instant>,
    current: Option<bool>,
}

impl BlockingWatch {
    /// The first poll is due immediately.
    pub fn new(changes: Receiver<StorageChange>, coordinator: CoordinatorHandle, poll_interval: Duration) -> Self {
        Self {
            changes,
            coordinator,
            poll_interval,
            next_poll: Some(Instant::now()),
            current: None,
        }
    }

    #[cfg(test)]
    fn current(&self) -> Option<bool> {
        self.current
    }

    /// Drain pending notifications and poll if due, without waiting.
    /// Returns the newest changed value.
    pub fn try_next(&mut self) -> Option<bool> {
        let mut latest = None;
        while let Ok(change) = self.changes.try_recv() {
            if let Some(value) = self.apply_change(&change) {
                latest = Some(value);
            }
        }
        if self.next_poll.is_some_and(|at| Instant::now() >= at) {
            if let Some(value) = self.poll_now() {
                latest = Some(value);
            }
        }
        latest
    }

    /// Wait up to `timeout` for the blocking state to change.
    pub fn next_change(&mut self, timeout: Duration) -> Option<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(value) = self.try_next() {
                return Some(value);
            }

            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let wake = self.next_poll.map_or(deadline, |at| deadline.min(at));
            match self.changes.recv_timeout(wake.saturating_duration_since(now)) {
                Ok(change) => {
                    if let Some(value) = self.apply_change(&change) {
                        return Some(value);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Ask the coordinator for a fresh status now, resetting the poll timer.
    pub fn poll_now(&mut self) -> Option<bool> {
        self.next_poll = Instant::now().checked_add(self.poll_interval);
        if self.next_poll.is_none() {
            warn!("Poll interval {:?} is out of range, fallback polling disabled", self.poll_interval);
        }
        match self.coordinator.check_status() {
            Ok(value) => self.observe(value),
            Err(e) => {
                warn!("Blocking status poll failed: {e}");
                None
            }
        }
    }

    fn apply_change(&mut self, change: &StorageChange) -> Option<bool> {
        if change.scope != Scope::Local || change.key != KEY_IS_BLOCKING {
            return None;
        }
        change.new_value.as_bool().and_then(|value| self.observe(value))
    }

    fn observe(&mut self, value: bool) -> Option<bool> {
        if self.current == Some(value) {
            return None;
        }
        self.current = Some(value);
        Some(value)
    }
}
