//! qdeck persistence: a tiny key-value store for dashboard preferences.
//! Synchronous and best-effort; callers log failures instead of surfacing them.

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use metrics::{counter, histogram};
use tracing::warn;

pub const KEY_REGION: &str = "qdeck-region";
pub const KEY_HIDE_EMPTY: &str = "qdeck-hide-empty";
pub const KEY_AUTO_REFRESH: &str = "qdeck-auto-refresh";

pub trait PrefStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// SQLite-backed store.
pub struct SqliteStore {
    db: Mutex<rusqlite::Connection>,
}

impl SqliteStore {
    pub fn open_default() -> Result<Self> {
        let path = std::env::var("QDECK_DB_PATH").unwrap_or_else(|_| default_db_path());
        Self::open(&path)
    }

    pub fn open(path: &str) -> Result<Self> {
        let started = std::time::Instant::now();
        let db = rusqlite::Connection::open(path).with_context(|| format!("opening sqlite db at {}", path))?;
        db.pragma_update(None, "journal_mode", &"WAL").ok();
        db.execute(
            "CREATE TABLE IF NOT EXISTS prefs (
                key   TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            )",
            [],
        )
        .context("creating prefs table")?;
        histogram!("prefs_open_ms", started.elapsed().as_secs_f64() * 1000.0);
        Ok(Self { db: Mutex::new(db) })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, rusqlite::Connection>> {
        self.db.lock().map_err(|_| anyhow!("prefs db lock poisoned"))
    }
}

impl PrefStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let started = std::time::Instant::now();
        let db = self.lock()?;
        let mut stmt = db.prepare("SELECT value FROM prefs WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        let out = match rows.next()? {
            Some(row) => Some(row.get::<_, String>(0)?),
            None => None,
        };
        histogram!("prefs_get_ms", started.elapsed().as_secs_f64() * 1000.0);
        Ok(out)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let started = std::time::Instant::now();
        let db = self.lock()?;
        db.execute(
            "INSERT INTO prefs(key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )
        .with_context(|| format!("writing pref {}", key))?;
        histogram!("prefs_put_ms", started.elapsed().as_secs_f64() * 1000.0);
        counter!("prefs_put_total", 1u64);
        Ok(())
    }
}

/// In-memory store for tests and `--no-persist` runs.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl PrefStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.map.lock().map_err(|_| anyhow!("prefs lock poisoned"))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.lock().map_err(|_| anyhow!("prefs lock poisoned"))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences restored at startup. `None` means never written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub region: Option<String>,
    pub hide_empty: Option<bool>,
    pub auto_refresh: Option<bool>,
}

impl Preferences {
    /// Read all keys; unreadable keys are logged and treated as unset.
    pub fn load(store: &dyn PrefStore) -> Self {
        let read = |key: &str| match store.get(key) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "prefs: read failed");
                None
            }
        };
        Self {
            region: read(KEY_REGION).filter(|s| !s.is_empty()),
            hide_empty: read(KEY_HIDE_EMPTY).map(|s| s == "true"),
            auto_refresh: read(KEY_AUTO_REFRESH).map(|s| s == "true"),
        }
    }
}

/// Write a key, logging instead of failing.
pub fn save_best_effort(store: &dyn PrefStore, key: &str, value: &str) -> bool {
    match store.set(key, value) {
        Ok(()) => true,
        Err(e) => {
            warn!(key, error = %e, "prefs: write failed");
            false
        }
    }
}

pub fn save_flag(store: &dyn PrefStore, key: &str, on: bool) -> bool {
    save_best_effort(store, key, if on { "true" } else { "false" })
}

fn default_db_path() -> String {
    if let Some(home) = std::env::var_os("HOME") {
        let mut p = std::path::PathBuf::from(home);
        p.push(".qdeck");
        let _ = std::fs::create_dir_all(&p);
        p.push("qdeck.db");
        return p.to_string_lossy().to_string();
    }
    "qdeck.db".to_string()
}
