//! Transient toast notifications.
//!
//! Toasts auto-expire after a fixed duration and are fanned out to
//! renderers over a broadcast channel. The inline error slot is not here;
//! it lives on `FormState::last_error`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    expires_at: Instant,
}

impl Toast {
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Events sent to toast subscribers.
#[derive(Debug, Clone)]
pub enum ToastEvent {
    Shown(Toast),
    Cleared,
}

pub struct Notifier {
    toasts: RwLock<Vec<Toast>>,
    duration: Duration,
    tx: broadcast::Sender<ToastEvent>,
}

impl Notifier {
    pub fn new(duration: Duration) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self {
            toasts: RwLock::new(Vec::new()),
            duration,
            tx,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ToastEvent> {
        self.tx.subscribe()
    }

    pub async fn success(&self, message: impl Into<String>) -> Toast {
        self.show(ToastKind::Success, message.into()).await
    }

    pub async fn info(&self, message: impl Into<String>) -> Toast {
        self.show(ToastKind::Info, message.into()).await
    }

    async fn show(&self, kind: ToastKind, message: String) -> Toast {
        let toast = Toast {
            id: Uuid::new_v4(),
            kind,
            message,
            created_at: Utc::now(),
            expires_at: Instant::now() + self.duration,
        };
        debug!(toast_id = %toast.id, kind = ?kind, "Toast shown");

        {
            let mut toasts = self.toasts.write().await;
            toasts.retain(|t| !t.is_expired());
            toasts.push(toast.clone());
        }

        let _ = self.tx.send(ToastEvent::Shown(toast.clone()));
        toast
    }

    /// Toasts still on screen.
    pub async fn active_toasts(&self) -> Vec<Toast> {
        let mut toasts = self.toasts.write().await;
        toasts.retain(|t| !t.is_expired());
        toasts.clone()
    }

    /// Dismiss every pending toast.
    pub async fn clear(&self) {
        let removed = {
            let mut toasts = self.toasts.write().await;
            let n = toasts.len();
            toasts.clear();
            n
        };
        if removed > 0 {
            debug!(count = removed, "Toasts cleared");
        }
        let _ = self.tx.send(ToastEvent::Cleared);
    }
}
