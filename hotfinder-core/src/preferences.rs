//! Saved filters, search history and favorite channels on top of a key-value JSON store.

use crate::clock::Clock;
use crate::error::{HotFinderError, Result};
use crate::models::{
    ChannelRecord, FavoriteChannel, FilterConfiguration, SearchHistoryEntry, SearchKind,
};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const FILTERS_KEY: &str = "filters";
pub const SEARCH_HISTORY_KEY: &str = "searchHistory";
pub const FAVORITE_CHANNELS_KEY: &str = "favoriteChannels";

pub const SEARCH_HISTORY_LIMIT: usize = 50;
const SUGGESTION_LIMIT: usize = 10;
const MIN_SUGGESTION_QUERY_CHARS: usize = 2;

/// Key-value store of JSON blobs.
pub trait PreferenceStore: Send + Sync {
    fn load(&self, key: &str) -> Option<Value>;
    fn save(&self, key: &str, value: Value) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self, key: &str) -> Option<Value> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn save(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| HotFinderError::Storage(e.to_string()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| HotFinderError::Storage(e.to_string()))?;
        values.remove(key);
        Ok(())
    }
}

pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
    clock: Arc<dyn Clock>,
}

impl Preferences {
    pub fn new(store: Arc<dyn PreferenceStore>, clock: Arc<dyn Clock>) -> Self {
        Preferences { store, clock }
    }

    /// Saved filters, or the dashboard defaults when nothing usable is stored.
    pub fn filters(&self) -> FilterConfiguration {
        self.load_as(FILTERS_KEY)
            .unwrap_or_else(FilterConfiguration::dashboard_defaults)
    }

    pub fn save_filters(&self, filters: &FilterConfiguration) -> Result<()> {
        self.save_as(FILTERS_KEY, filters)
    }

    /// Most recent first.
    pub fn search_history(&self) -> Vec<SearchHistoryEntry> {
        self.load_as(SEARCH_HISTORY_KEY).unwrap_or_default()
    }

    pub fn last_search(&self) -> Option<SearchHistoryEntry> {
        self.search_history().into_iter().next()
    }

    /// Move (or insert) the query to the front, keeping at most 50 entries.
    pub fn record_search(&self, query: &str, kind: SearchKind) -> Result<()> {
        let mut history: Vec<SearchHistoryEntry> = self
            .search_history()
            .into_iter()
            .filter(|entry| !(entry.query == query && entry.kind == kind))
            .collect();

        history.insert(
            0,
            SearchHistoryEntry {
                query: query.to_string(),
                kind,
                timestamp: self.clock.now(),
            },
        );
        history.truncate(SEARCH_HISTORY_LIMIT);

        self.save_as(SEARCH_HISTORY_KEY, &history)
    }

    /// Earlier keyword searches containing `query`, case-insensitively.
    pub fn suggestions(&self, query: &str) -> Vec<String> {
        if query.chars().count() < MIN_SUGGESTION_QUERY_CHARS {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        let mut seen = HashSet::new();
        self.search_history()
            .into_iter()
            .filter(|entry| entry.kind == SearchKind::Keyword)
            .filter(|entry| entry.query.to_lowercase().contains(&needle))
            .map(|entry| entry.query)
            .filter(|q| seen.insert(q.clone()))
            .take(SUGGESTION_LIMIT)
            .collect()
    }

    pub fn favorite_channels(&self) -> Vec<FavoriteChannel> {
        self.load_as(FAVORITE_CHANNELS_KEY).unwrap_or_default()
    }

    /// Returns `false` when the channel was already a favorite.
    pub fn add_favorite_channel(&self, channel: ChannelRecord) -> Result<bool> {
        let mut favorites = self.favorite_channels();
        if favorites.iter().any(|fav| fav.channel.id == channel.id) {
            return Ok(false);
        }

        favorites.push(FavoriteChannel {
            channel,
            added_at: self.clock.now(),
        });
        self.save_as(FAVORITE_CHANNELS_KEY, &favorites)?;
        Ok(true)
    }

    /// Returns `false` when no favorite had that id.
    pub fn remove_favorite_channel(&self, channel_id: &str) -> Result<bool> {
        let favorites = self.favorite_channels();
        let before = favorites.len();
        let remaining: Vec<FavoriteChannel> = favorites
            .into_iter()
            .filter(|fav| fav.channel.id != channel_id)
            .collect();

        if remaining.len() == before {
            return Ok(false);
        }
        self.save_as(FAVORITE_CHANNELS_KEY, &remaining)?;
        Ok(true)
    }

    pub fn clear_all(&self) -> Result<()> {
        for key in [FILTERS_KEY, SEARCH_HISTORY_KEY, FAVORITE_CHANNELS_KEY] {
            self.store.remove(key)?;
        }
        Ok(())
    }

    fn load_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.store.load(key)?;
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Ignoring unreadable preference '{key}': {e}");
                None
            }
        }
    }

    fn save_as<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_value(value)
            .map_err(|e| HotFinderError::Storage(format!("failed to encode '{key}': {e}")))?;
        self.store.save(key, json)
    }
}
