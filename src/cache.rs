use crate::api::DiaryApi;
use crate::errors::ApiError;
use crate::models::DiaryRecord;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheEntry {
    pub data: Option<DiaryRecord>,
    pub error: Option<ApiError>,
}

struct Slot {
    entry: CacheEntry,
    stale: bool,
}

/// Diary records keyed by the date string they were requested with.
///
/// Clones share the same slots, so every reader of a key sees the result of
/// any invalidation.
pub struct DiaryCache<A> {
    api: Arc<A>,
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl<A> Clone for DiaryCache<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<A: DiaryApi> DiaryCache<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Returns the cached entry, loading it first if absent or invalidated.
    pub async fn fetch(&self, key: &str) -> CacheEntry {
        {
            let slots = self.slots.lock().await;
            if let Some(slot) = slots.get(key) {
                if !slot.stale {
                    return slot.entry.clone();
                }
            }
        }
        self.load(key).await
    }

    pub async fn revalidate(&self, key: &str) -> CacheEntry {
        self.load(key).await
    }

    pub async fn invalidate(&self, key: &str) {
        if let Some(slot) = self.slots.lock().await.get_mut(key) {
            slot.stale = true;
        }
    }

    pub async fn peek(&self, key: &str) -> Option<CacheEntry> {
        self.slots.lock().await.get(key).map(|slot| slot.entry.clone())
    }

    /// Records currently held, newest date first.
    pub async fn snapshot(&self) -> Vec<DiaryRecord> {
        let slots = self.slots.lock().await;
        let mut records: Vec<DiaryRecord> = slots
            .values()
            .filter_map(|slot| slot.entry.data.clone())
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records.dedup_by(|a, b| a.date == b.date);
        records
    }

    async fn load(&self, key: &str) -> CacheEntry {
        let result = self.api.get_diary(key).await;

        let mut slots = self.slots.lock().await;
        let previous = slots.get(key).and_then(|slot| slot.entry.data.clone());
        let entry = match result {
            Ok(data) => CacheEntry { data, error: None },
            Err(ApiError::NotFound) => CacheEntry {
                data: None,
                error: Some(ApiError::NotFound),
            },
            Err(err) => {
                warn!(key, "failed to load diary: {err}");
                // keep showing the last good record next to the error
                CacheEntry {
                    data: previous,
                    error: Some(err),
                }
            }
        };
        slots.insert(
            key.to_string(),
            Slot {
                entry: entry.clone(),
                stale: false,
            },
        );
        // empty slots are cheap to refetch; only the latest one is kept
        slots.retain(|slot_key, slot| slot_key == key || slot.entry.data.is_some());
        entry
    }
}

/// Subscription of one consumer to the cache entry of a changing key.
///
/// `resolve` reports whether the resource behind the current key differs
/// from the one this query last handed out, which is the consumer's cue to
/// re-read it.
pub struct DiaryQuery<A> {
    cache: DiaryCache<A>,
    key: String,
    resolved: Option<(String, CacheEntry)>,
    key_changed: bool,
}

impl<A: DiaryApi> DiaryQuery<A> {
    pub fn new(cache: DiaryCache<A>, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
            resolved: None,
            key_changed: true,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Moving to a different key forces the next `resolve` to go back to
    /// the api, even when the cache already holds an entry for it.
    pub fn set_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        if key != self.key {
            self.key = key;
            self.key_changed = true;
        }
    }

    pub fn cache(&self) -> &DiaryCache<A> {
        &self.cache
    }

    /// Entry for the current key, if it has been resolved since the key last
    /// changed.
    pub fn current(&self) -> Option<&CacheEntry> {
        match &self.resolved {
            Some((key, entry)) if *key == self.key => Some(entry),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&DiaryRecord> {
        self.current().and_then(|entry| entry.data.as_ref())
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.current().and_then(|entry| entry.error.as_ref())
    }

    pub async fn resolve(&mut self) -> bool {
        let entry = if self.key_changed {
            self.cache.revalidate(&self.key).await
        } else {
            self.cache.fetch(&self.key).await
        };
        self.record(entry)
    }

    pub async fn revalidate(&mut self) -> bool {
        let entry = self.cache.revalidate(&self.key).await;
        self.record(entry)
    }

    fn record(&mut self, entry: CacheEntry) -> bool {
        self.key_changed = false;
        let changed = match &self.resolved {
            Some((key, previous)) => *key != self.key || *previous != entry,
            None => true,
        };
        self.resolved = Some((self.key.clone(), entry));
        changed
    }
}
