//! Star currency shared by every game.
//!
//! Stars are a single decimal integer stored under [`STARS_KEY`] in whatever
//! string key-value store the host provides (browser local storage, a JSON
//! file, memory in tests).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use tracing::{info, warn};

use crate::error::StoreError;

pub const STARS_KEY: &str = "gnosisStars";

/// Minimal get/set string store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Current balance. Missing or garbled values count as zero.
pub fn star_balance(store: &dyn KeyValueStore) -> u64 {
    let Some(raw) = store.get(STARS_KEY) else {
        return 0;
    };
    match raw.trim().parse::<u64>() {
        Ok(n) => n,
        Err(_) => {
            warn!(value = %raw, "unreadable star balance; treating as 0");
            0
        }
    }
}

/// Add `earned` to the stored balance and return the new balance.
pub fn deposit_stars(store: &mut dyn KeyValueStore, earned: u64) -> Result<u64, StoreError> {
    let current = star_balance(store);
    if earned == 0 {
        return Ok(current);
    }
    let balance = current.saturating_add(earned);
    store.set(STARS_KEY, &balance.to_string())?;
    info!(earned, balance, "stars deposited");
    Ok(balance)
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All keys in one pretty-printed JSON object on disk.
///
/// Every `set` rewrites the file through a temporary sibling and a rename,
/// so a crash never leaves half a file behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let items = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let raw = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    /// The in-memory view only changes once the file is written, so a failed
    /// write leaves `get` reporting what is on disk.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut next = self.items.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        self.items = next;
        Ok(())
    }
}
