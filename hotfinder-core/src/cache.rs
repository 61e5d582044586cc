use crate::clock::Clock;
use crate::models::FilterConfiguration;
use crate::ranking::{SortKey, SortOrder};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Five minutes.
pub const CACHE_TTL_MILLIS: i64 = 5 * 60 * 1000;

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub key: String,
    pub data: T,
    pub stored_at_epoch_millis: i64,
}

/// Time-bounded memoization of fetch results.
///
/// Expired entries are shadowed by `get`, never purged; the next `set` for the key
/// overwrites them.
pub struct ResultCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    clock: Arc<dyn Clock>,
    ttl_millis: i64,
}

impl<T: Clone> ResultCache<T> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, CACHE_TTL_MILLIS)
    }

    pub fn with_ttl(clock: Arc<dyn Clock>, ttl_millis: i64) -> Self {
        ResultCache {
            entries: Mutex::new(HashMap::new()),
            clock,
            ttl_millis,
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now_millis();
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(key)?;

        if now - entry.stored_at_epoch_millis < self.ttl_millis {
            Some(entry.data.clone())
        } else {
            debug!("Cache entry '{key}' is stale");
            None
        }
    }

    pub fn set(&self, key: &str, value: T) {
        let entry = CacheEntry {
            key: key.to_string(),
            data: value,
            stored_at_epoch_millis: self.clock.now_millis(),
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), entry);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Key for a keyword search. `region` and `max_results` are the values actually sent to
/// the platform, after defaults.
pub fn keyword_cache_key(
    keyword: &str,
    filters: &FilterConfiguration,
    sort_key: SortKey,
    sort_order: SortOrder,
    region: &str,
    max_results: u32,
) -> String {
    // Struct fields serialize in declaration order, so equal configs give equal keys.
    let filters_json = serde_json::to_string(filters).unwrap_or_default();
    format!(
        "keyword_{keyword}_{filters_json}_{}_{}_{region}_{max_results}",
        sort_key.as_str(),
        sort_order.as_str()
    )
}

pub fn channel_cache_key(handle: &str) -> String {
    format!("channel_{handle}")
}

pub fn trending_cache_key(region: &str, category: &str) -> String {
    format!("trending_{region}_{category}")
}
