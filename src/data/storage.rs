//! Per-symbol key/value persistence for drawings, orders and the trade log.

use std::collections::HashMap;

use serde::{Serialize, de::DeserializeOwned};

use crate::config::{DF, PERSISTENCE, storage_key};

/// Minimal string store. Missing keys read as `None`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-process store, used by the headless tools and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Adapter over eframe's app storage. eframe has no delete, so removal writes
/// an empty value and `get` reports empty values as absent.
pub struct EframeStore<'a> {
    storage: &'a mut dyn eframe::Storage,
}

impl<'a> EframeStore<'a> {
    pub fn new(storage: &'a mut dyn eframe::Storage) -> Self {
        Self { storage }
    }
}

impl KeyValueStore for EframeStore<'_> {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_string(key).filter(|s| !s.is_empty())
    }

    fn set(&mut self, key: &str, value: String) {
        self.storage.set_string(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.storage.set_string(key, String::new());
    }
}

/// What an entry holds. Each kind is stored separately per symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Drawings,
    Positions,
    Trades,
    Cut,
}

impl DataKind {
    pub fn name(&self) -> &'static str {
        match self {
            DataKind::Drawings => PERSISTENCE.storage.drawings_kind,
            DataKind::Positions => PERSISTENCE.storage.positions_kind,
            DataKind::Trades => PERSISTENCE.storage.trades_kind,
            DataKind::Cut => PERSISTENCE.storage.cut_kind,
        }
    }

    pub fn key(&self, symbol: &str) -> String {
        storage_key(self.name(), symbol)
    }
}

/// Read one entry. Missing or unreadable data yields `T::default()`.
pub fn load_json<T>(store: &dyn KeyValueStore, kind: DataKind, symbol: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let key = kind.key(symbol);
    let Some(raw) = store.get(&key) else {
        return T::default();
    };
    match serde_json::from_str(&raw) {
        Ok(value) => {
            if DF.log_persistence {
                log::info!("Loaded {} ({} bytes)", key, raw.len());
            }
            value
        }
        Err(e) => {
            log::warn!("Ignoring corrupt entry {}: {}", key, e);
            T::default()
        }
    }
}

pub fn save_json<T>(store: &mut dyn KeyValueStore, kind: DataKind, symbol: &str, value: &T)
where
    T: Serialize + ?Sized,
{
    let key = kind.key(symbol);
    match serde_json::to_string(value) {
        Ok(json) => {
            if DF.log_persistence {
                log::info!("Saving {} ({} bytes)", key, json.len());
            }
            store.set(&key, json);
        }
        Err(e) => log::warn!("Failed to serialize {}: {}", key, e),
    }
}

pub fn erase(store: &mut dyn KeyValueStore, kind: DataKind, symbol: &str) {
    let key = kind.key(symbol);
    if DF.log_persistence {
        log::info!("Erasing {}", key);
    }
    store.remove(&key);
}

/// Stops the state we just loaded from being written straight back.
///
/// `arm` after a load; the next `allow_save` returns false and disarms.
#[derive(Debug, Default, Clone, Copy)]
pub struct PersistGate {
    suppressed: bool,
}

impl PersistGate {
    pub fn arm(&mut self) {
        self.suppressed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.suppressed
    }

    pub fn allow_save(&mut self) -> bool {
        !std::mem::take(&mut self.suppressed)
    }
}
