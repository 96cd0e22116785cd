//! Persistence of dates, active counter, granularity and theme.
//!
//! Everything is stored as text in a string key/value store (the browser's
//! `localStorage` in production). Reads never fail from the caller's point of
//! view: a missing key and an unreadable value both yield the default, and the
//! latter is logged. Writes that fail are logged and dropped.

use chrono::NaiveDate;
use log::warn;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use crate::config::{ACTIVE_COUNTER_KEY, DATES_KEY, GRANULARITY_KEY, THEME_KEY};
use crate::{ActiveCounter, DateBook, Granularity, NamedDate, Theme};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    Unavailable,
    Read(String),
    Write(String),
    Parse { key: String, message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "Local storage is not available"),
            StorageError::Read(key) => write!(f, "Failed to read '{}'", key),
            StorageError::Write(key) => write!(f, "Failed to write '{}'", key),
            StorageError::Parse { key, message } => {
                write!(f, "Stored value for '{}' is unreadable: {}", key, message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Minimal string key/value store, shaped like the Web Storage API.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// `window.localStorage`.
pub struct BrowserStorage {
    inner: web_sys::Storage,
}

impl BrowserStorage {
    /// Fails when there is no window or storage is disabled (e.g. privacy mode).
    pub fn open() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .ok_or(StorageError::Unavailable)?
            .local_storage()
            .map_err(|_| StorageError::Unavailable)?
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { inner: storage })
    }
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner
            .get_item(key)
            .map_err(|_| StorageError::Read(key.to_string()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner
            .set_item(key, value)
            .map_err(|_| StorageError::Write(key.to_string()))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner
            .remove_item(key)
            .map_err(|_| StorageError::Write(key.to_string()))
    }
}

/// In-memory store; used when local storage is unavailable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Stored shape of the active counter.
#[derive(Serialize, Deserialize)]
struct StoredCounter {
    name: String,
    #[serde(rename = "dateObj")]
    date: NaiveDate,
}

pub struct Persistence<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn load_dates(&self) -> DateBook {
        self.read_json::<Vec<NamedDate>>(DATES_KEY)
            .map(DateBook::from_entries)
            .unwrap_or_default()
    }

    pub fn save_dates(&self, dates: &DateBook) {
        self.write_json(DATES_KEY, dates);
    }

    pub fn load_active(&self) -> Option<ActiveCounter> {
        self.read_json::<StoredCounter>(ACTIVE_COUNTER_KEY)
            .map(|stored| ActiveCounter {
                name: stored.name,
                date: stored.date,
            })
    }

    /// `None` removes the stored counter.
    pub fn save_active(&self, active: Option<&ActiveCounter>) {
        match active {
            Some(counter) => self.write_json(
                ACTIVE_COUNTER_KEY,
                &StoredCounter {
                    name: counter.name.clone(),
                    date: counter.date,
                },
            ),
            None => {
                if let Err(err) = self.store.remove_item(ACTIVE_COUNTER_KEY) {
                    warn!("{}", err);
                }
            }
        }
    }

    pub fn load_granularity(&self) -> Granularity {
        self.read_parsed(GRANULARITY_KEY, |raw| {
            raw.trim().parse::<u8>().ok().and_then(Granularity::new)
        })
        .unwrap_or_default()
    }

    pub fn save_granularity(&self, granularity: Granularity) {
        self.write_raw(GRANULARITY_KEY, &granularity.level().to_string());
    }

    /// Stored theme, or `system()` when nothing usable is stored.
    pub fn load_theme(&self, system: impl FnOnce() -> Theme) -> Theme {
        self.read_parsed(THEME_KEY, Theme::parse)
            .unwrap_or_else(system)
    }

    pub fn save_theme(&self, theme: Theme) {
        self.write_raw(THEME_KEY, theme.as_str());
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.store.get_item(key) {
            Ok(value) => value,
            Err(err) => {
                warn!("{}", err);
                None
            }
        }
    }

    fn read_parsed<T>(&self, key: &str, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
        let raw = self.read_raw(key)?;
        let parsed = parse(&raw);
        if parsed.is_none() {
            let err = StorageError::Parse {
                key: key.to_string(),
                message: format!("unexpected value '{}'", raw),
            };
            warn!("{}, using default", err);
        }
        parsed
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                let err = StorageError::Parse {
                    key: key.to_string(),
                    message: e.to_string(),
                };
                warn!("{}, using default", err);
                None
            }
        }
    }

    fn write_raw(&self, key: &str, value: &str) {
        if let Err(err) = self.store.set_item(key, value) {
            warn!("{}", err);
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.write_raw(key, &json),
            Err(e) => warn!("Failed to serialize '{}': {}", key, e),
        }
    }
}
