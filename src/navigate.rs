use std::sync::{Arc, Mutex};
use tracing::info;

pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Remembers the last requested path until the web layer turns it into a
/// redirect.
#[derive(Clone, Default)]
pub struct PendingNavigation {
    target: Arc<Mutex<Option<String>>>,
}

impl PendingNavigation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Option<String> {
        self.target
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

impl Navigator for PendingNavigation {
    fn navigate(&self, path: &str) {
        info!(path, "navigating");
        *self
            .target
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(path.to_string());
    }
}
