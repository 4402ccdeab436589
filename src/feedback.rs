//! Ephemeral user notices.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::ApiError;

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub expires_at: Instant,
}

/// Queue of notices that dismiss themselves after `ttl`.
#[derive(Debug)]
pub struct Notices {
    ttl: Duration,
    queue: VecDeque<Notice>,
}

impl Default for Notices {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

impl Notices {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            queue: VecDeque::new(),
        }
    }

    fn push(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.queue.push_back(Notice {
            level,
            text: text.into(),
            expires_at: Instant::now() + self.ttl,
        });
    }

    pub fn push_success(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Success, text);
    }

    pub fn push_error(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Error, text);
    }

    pub fn push_api_error(&mut self, err: &ApiError) {
        self.push(NoticeLevel::Error, err.user_message());
    }

    /// Notices still on screen, oldest first. Expired ones are dropped.
    pub fn active(&mut self) -> Vec<Notice> {
        let now = Instant::now();
        self.queue.retain(|n| n.expires_at > now);
        self.queue.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
