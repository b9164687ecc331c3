use serde::Serialize;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;
use tracing::{error, info};

pub const SUCCESS_DURATION: Duration = Duration::from_millis(1000);
pub const ERROR_DURATION: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ToastId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub message: String,
    pub duration_ms: Option<u64>,
}

/// Sink for transient user notifications.
///
/// A loading toast is later replaced in place by passing its id to
/// `success` or `error`.
pub trait Notifier: Send + Sync {
    fn loading(&self, message: &str) -> ToastId;
    fn success(&self, replaces: Option<ToastId>, message: &str);
    fn error(&self, replaces: Option<ToastId>, message: &str);
}

/// Keeps toasts in memory until the view drains them.
#[derive(Clone, Default)]
pub struct ToastLog {
    next_id: Arc<AtomicU64>,
    toasts: Arc<Mutex<Vec<Toast>>>,
}

impl ToastLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Vec<Toast> {
        self.lock().clone()
    }

    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Toast>> {
        self.toasts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn put(&self, replaces: Option<ToastId>, kind: ToastKind, message: &str) -> ToastId {
        let duration_ms = match kind {
            ToastKind::Loading => None,
            ToastKind::Success => Some(SUCCESS_DURATION.as_millis() as u64),
            ToastKind::Error => Some(ERROR_DURATION.as_millis() as u64),
        };
        let mut toasts = self.lock();
        let id = match replaces {
            Some(id) => {
                toasts.retain(|toast| toast.id != id);
                id
            }
            None => ToastId(self.next_id.fetch_add(1, Ordering::Relaxed)),
        };
        toasts.push(Toast {
            id,
            kind,
            message: message.to_string(),
            duration_ms,
        });
        id
    }
}

impl Notifier for ToastLog {
    fn loading(&self, message: &str) -> ToastId {
        info!("{message}");
        self.put(None, ToastKind::Loading, message)
    }

    fn success(&self, replaces: Option<ToastId>, message: &str) {
        info!("{message}");
        self.put(replaces, ToastKind::Success, message);
    }

    fn error(&self, replaces: Option<ToastId>, message: &str) {
        error!("{message}");
        self.put(replaces, ToastKind::Error, message);
    }
}
