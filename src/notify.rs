//! Toast notifications with per-session de-duplication.
//!
//! A message is shown at most once per `ttl` for a given severity. The
//! de-duplication state is an owned value built once per session and handed
//! to whatever issues notifications.
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message:  String,
    pub severity: Severity,
}

/// TTL cache of recently emitted `(message, severity)` keys.
#[derive(Debug)]
pub struct NotificationDeduper {
    ttl:  Duration,
    seen: HashMap<(String, Severity), Instant>,
}

impl NotificationDeduper {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, seen: HashMap::new() }
    }

    /// Returns true and remembers the key if it has not been emitted within
    /// the TTL; returns false for a live duplicate.
    pub fn should_emit(&mut self, message: &str, severity: Severity) -> bool {
        let now = Instant::now();
        self.prune_at(now);

        let key = (message.to_owned(), severity);
        if self.seen.contains_key(&key) {
            debug!(msg = message, ?severity, "suppressed duplicate notification");
            return false;
        }
        self.seen.insert(key, now + self.ttl);
        true
    }

    /// Drops every expired entry.
    pub fn prune(&mut self) {
        self.prune_at(Instant::now());
    }

    pub fn len(&self) -> usize { self.seen.len() }

    pub fn is_empty(&self) -> bool { self.seen.is_empty() }

    fn prune_at(&mut self, now: Instant) {
        self.seen.retain(|_, expires| *expires > now);
    }
}

/// The visible toast stack, newest last, fronted by a deduper.
#[derive(Debug)]
pub struct Toasts {
    deduper:  NotificationDeduper,
    ttl:      Duration,
    capacity: usize,
    visible:  VecDeque<(Notification, Instant)>,
}

impl Toasts {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            deduper: NotificationDeduper::new(ttl),
            ttl,
            capacity: capacity.max(1),
            visible: VecDeque::new(),
        }
    }

    /// Queues a toast unless an identical one was shown within the TTL.
    pub fn push(&mut self, message: impl Into<String>, severity: Severity) -> bool {
        let message = message.into();
        if !self.deduper.should_emit(&message, severity) {
            return false;
        }
        if self.visible.len() == self.capacity {
            self.visible.pop_front();
        }
        self.visible.push_back((Notification { message, severity }, Instant::now()));
        true
    }

    /// Hides toasts that have been on screen for longer than the TTL.
    pub fn expire(&mut self) {
        let ttl = self.ttl;
        self.visible.retain(|(_, shown)| shown.elapsed() < ttl);
        self.deduper.prune();
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.visible.back().map(|(n, _)| n)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> + '_ {
        self.visible.iter().map(|(n, _)| n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn duplicate_within_ttl_is_suppressed() {
        let mut dedup = NotificationDeduper::new(Duration::from_secs(5));
        assert!(dedup.should_emit("Site saved", Severity::Success));
        assert!(!dedup.should_emit("Site saved", Severity::Success));

        advance(Duration::from_millis(4_999)).await;
        assert!(!dedup.should_emit("Site saved", Severity::Success));

        advance(Duration::from_millis(1)).await;
        assert!(dedup.should_emit("Site saved", Severity::Success));
    }

    #[tokio::test(start_paused = true)]
    async fn severity_is_part_of_the_key() {
        let mut dedup = NotificationDeduper::new(Duration::from_secs(5));
        assert!(dedup.should_emit("Budget rejected", Severity::Error));
        assert!(dedup.should_emit("Budget rejected", Severity::Warning));
        assert!(dedup.should_emit("Other message", Severity::Error));
        assert_eq!(dedup.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_are_pruned() {
        let mut dedup = NotificationDeduper::new(Duration::from_secs(2));
        dedup.should_emit("a", Severity::Info);
        advance(Duration::from_secs(1)).await;
        dedup.should_emit("b", Severity::Info);
        advance(Duration::from_secs(1)).await;
        dedup.prune();
        assert_eq!(dedup.len(), 1);
        advance(Duration::from_secs(1)).await;
        dedup.prune();
        assert!(dedup.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn toasts_are_capped_and_expire() {
        let mut toasts = Toasts::new(Duration::from_secs(3), 2);
        assert!(toasts.push("one", Severity::Info));
        assert!(!toasts.push("one", Severity::Info));
        assert!(toasts.push("two", Severity::Info));
        assert!(toasts.push("three", Severity::Error));

        let shown: Vec<&str> = toasts.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(shown, ["two", "three"]);
        assert_eq!(toasts.latest().map(|n| n.severity), Some(Severity::Error));

        advance(Duration::from_secs(3)).await;
        toasts.expire();
        assert!(toasts.latest().is_none());
        assert!(toasts.push("one", Severity::Info));
    }
}
