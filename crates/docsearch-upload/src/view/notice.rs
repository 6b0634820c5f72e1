//! Page-level notice shown above the job list.

use std::sync::RwLock;

use chrono::{DateTime, Utc};

/// A message for the user and when it was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// Holds the most recent page-level error message.
#[derive(Default)]
pub struct NoticeBoard {
    current: RwLock<Option<Notice>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current notice.
    pub fn raise(&self, message: impl Into<String>) {
        let notice = Notice {
            message: message.into(),
            raised_at: Utc::now(),
        };
        match self.current.write() {
            Ok(mut guard) => *guard = Some(notice),
            Err(poisoned) => *poisoned.into_inner() = Some(notice),
        }
    }

    pub fn clear(&self) {
        match self.current.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    pub fn current(&self) -> Option<Notice> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Current message text, if any.
    pub fn message(&self) -> Option<String> {
        self.current().map(|notice| notice.message)
    }
}
