//! Ephemeral user-facing messages.
//!
//! The engine only emits. Expiry is up to the presentation layer, which
//! reads `current()` and calls `dismiss()` once `display_ms` has elapsed.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Failure,
    Weather,
    Production,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub display_ms: u64,
}

impl Notification {
    pub fn display_for(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }
}

/// Bounded FIFO of pending notifications; the oldest is dropped when full.
#[derive(Clone, Debug)]
pub struct Notifications {
    queue: VecDeque<Notification>,
    capacity: usize,
    display_ms: u64,
}

impl Notifications {
    pub fn new(capacity: usize, display: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            display_ms: u64::try_from(display.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn emit(&mut self, kind: NotificationKind, message: impl Into<String>) {
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(Notification {
            kind,
            message: message.into(),
            display_ms: self.display_ms,
        });
    }

    /// The message currently on screen.
    pub fn current(&self) -> Option<&Notification> {
        self.queue.front()
    }

    /// The most recent message, i.e. what an overwrite-only channel shows.
    pub fn latest(&self) -> Option<&Notification> {
        self.queue.back()
    }

    /// Retire the current message once its display time is over.
    pub fn dismiss(&mut self) -> Option<Notification> {
        self.queue.pop_front()
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_and_dismiss() {
        let mut n = Notifications::new(4, Duration::from_millis(3000));
        n.emit(NotificationKind::Weather, "rainy");
        n.emit(NotificationKind::Production, "egg");
        assert_eq!(n.current().unwrap().message, "rainy");
        assert_eq!(n.latest().unwrap().message, "egg");
        assert_eq!(n.current().unwrap().display_for(), Duration::from_secs(3));
        n.dismiss();
        assert_eq!(n.current().unwrap().message, "egg");
        n.dismiss();
        assert!(n.current().is_none());
    }

    #[test]
    fn drops_oldest_when_full() {
        let mut n = Notifications::new(2, Duration::from_millis(10));
        n.emit(NotificationKind::Success, "a");
        n.emit(NotificationKind::Success, "b");
        n.emit(NotificationKind::Success, "c");
        let left: Vec<_> = n.drain().into_iter().map(|m| m.message).collect();
        assert_eq!(left, vec!["b", "c"]);
        assert!(n.is_empty());
    }
}
