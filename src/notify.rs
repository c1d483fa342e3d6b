//! Transient status notifications.
//!
//! Every notice carries its own expiry; [`Notifications::expire`] drops the
//! ones whose deadline has passed. The owner decides when to call it, which
//! keeps the queue itself free of timers.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct Notifications {
    items: Vec<Notice>,
    next_id: u64,
    ttl: Duration,
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            ttl,
        }
    }

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        self.push_at(level, message, Instant::now())
    }

    pub fn push_at(&mut self, level: NoticeLevel, message: impl Into<String>, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let message = message.into();

        match level {
            NoticeLevel::Error => tracing::warn!("{message}"),
            _ => tracing::info!("{message}"),
        }

        self.items.push(Notice {
            id,
            level,
            message,
            expires_at: now + self.ttl,
        });
        id
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Info, message)
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Error, message)
    }

    /// Removes every notice due at or before `now`; returns how many went.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.items.len();
        self.items.retain(|notice| notice.expires_at > now);
        before - self.items.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.items.iter().map(|notice| notice.expires_at).min()
    }

    /// Visible notices, oldest first.
    pub fn active(&self) -> &[Notice] {
        &self.items
    }

    /// Hands over every visible notice and empties the queue.
    pub fn take_all(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.items)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
