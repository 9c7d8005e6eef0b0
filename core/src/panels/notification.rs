//! Notification toasts
//!
//! Bounded queue of short-lived messages. When full, the oldest toast is
//! dropped to make room. Expiry is driven by the caller's clock reading.

use std::collections::VecDeque;
use std::time::Duration;

use lifeline_types::{NotificationConfig, NotificationData, ToastSeverity};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub severity: ToastSeverity,
    pub expires_at: Duration,
}

#[derive(Debug, Clone)]
pub struct NotificationQueue {
    toasts: VecDeque<Toast>,
    config: NotificationConfig,
    next_id: u64,
}

impl NotificationQueue {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            toasts: VecDeque::new(),
            config,
            next_id: 1,
        }
    }

    fn lifetime(&self, data: &NotificationData) -> Duration {
        let ms = data.duration_ms.unwrap_or(match data.severity {
            ToastSeverity::Normal => self.config.normal_ms,
            ToastSeverity::Critical => self.config.critical_ms,
        });
        Duration::from_millis(ms)
    }

    /// Queue a toast shown from `now`; empty messages are ignored
    pub fn push(&mut self, data: NotificationData, now: Duration) -> Option<u64> {
        if data.message.trim().is_empty() || self.config.max_visible == 0 {
            return None;
        }
        while self.toasts.len() >= self.config.max_visible {
            self.toasts.pop_front();
        }
        let id = self.next_id;
        self.next_id += 1;
        let expires_at = now + self.lifetime(&data);
        self.toasts.push_back(Toast {
            id,
            message: data.message,
            severity: data.severity,
            expires_at,
        });
        Some(id)
    }

    /// Queue a toast from raw notification panel data
    pub fn push_data(&mut self, data: &Value, now: Duration) -> Option<u64> {
        match serde_json::from_value::<NotificationData>(data.clone()) {
            Ok(data) => self.push(data, now),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed notification");
                None
            }
        }
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    /// Drop toasts whose lifetime has passed; returns their ids
    pub fn expire(&mut self, now: Duration) -> Vec<u64> {
        let mut expired = Vec::new();
        self.toasts.retain(|toast| {
            let keep = toast.expires_at > now;
            if !keep {
                expired.push(toast.id);
            }
            keep
        });
        expired
    }

    pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
