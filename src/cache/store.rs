// =============================================================================
// Cache stores: where cached provider responses live
// =============================================================================
//
// `MemoryStore` keeps entries in a map guarded by a RwLock. `FileStore` keeps
// one `<symbol>_<resolution>.json` artifact per key holding the provider JSON
// verbatim; the file mtime is the entry timestamp.
//
// Either way an entry is replaced whole: readers see the old payload+timestamp
// pair or the new one, never a mix.
// =============================================================================

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::provider::RawResponse;
use crate::types::CacheKey;

/// Last successful response for one key.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub payload: RawResponse,
    pub stored_at: SystemTime,
}

pub trait CacheStore: Send + Sync {
    fn load(&self, key: &CacheKey) -> Option<CacheEntry>;

    /// Replace the entry for `entry.key`.
    fn save(&self, entry: &CacheEntry) -> Result<()>;
}

// =============================================================================
// MemoryStore
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn load(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.read().get(key).cloned()
    }

    fn save(&self, entry: &CacheEntry) -> Result<()> {
        self.entries.write().insert(entry.key.clone(), entry.clone());
        Ok(())
    }
}

// =============================================================================
// FileStore
// =============================================================================

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a cache directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create cache dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn artifact_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CacheStore for FileStore {
    fn load(&self, key: &CacheKey) -> Option<CacheEntry> {
        let path = self.artifact_path(key);
        let read = || -> Result<CacheEntry> {
            let stored_at = std::fs::metadata(&path)?.modified()?;
            let content = std::fs::read_to_string(&path)?;
            let payload = serde_json::from_str(&content)?;
            Ok(CacheEntry {
                key: key.clone(),
                payload,
                stored_at,
            })
        };

        match read() {
            Ok(entry) => Some(entry),
            Err(e) => {
                if path.exists() {
                    warn!(path = %path.display(), error = %e, "unreadable cache artifact ignored");
                }
                None
            }
        }
    }

    /// Atomic write: write to a temporary sibling file, stamp its mtime,
    /// then rename over the artifact.
    fn save(&self, entry: &CacheEntry) -> Result<()> {
        let path = self.artifact_path(&entry.key);
        let tmp_path = path.with_extension("json.tmp");

        let content = serde_json::to_vec(&entry.payload).context("failed to serialise cache payload")?;

        let mut file = File::create(&tmp_path)
            .with_context(|| format!("failed to create {}", tmp_path.display()))?;
        file.write_all(&content)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        file.set_modified(entry.stored_at)
            .with_context(|| format!("failed to stamp mtime on {}", tmp_path.display()))?;
        drop(file);

        std::fs::rename(&tmp_path, &path)
            .with_context(|| format!("failed to rename {} into place", tmp_path.display()))?;

        debug!(path = %path.display(), "cache artifact written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutputSize;
    use serde_json::json;
    use std::time::Duration;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ticker-advisor-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn entry(symbol: &str, stored_at: SystemTime) -> CacheEntry {
        CacheEntry {
            key: CacheKey::new(symbol, OutputSize::Compact),
            payload: json!({"Time Series (Daily)": {"2024-01-02": {"4. close": "1.5"}}}),
            stored_at,
        }
    }

    #[test]
    fn memory_store_overwrites() {
        let store = MemoryStore::new();
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let mut e = entry("AAPL", t0);
        store.save(&e).unwrap();
        e.payload = json!({"v": 2});
        e.stored_at = t0 + Duration::from_secs(5);
        store.save(&e).unwrap();
        assert_eq!(store.load(&e.key), Some(e));
    }

    #[test]
    fn file_store_round_trip_uses_mtime() {
        let dir = temp_dir("roundtrip");
        let store = FileStore::open(&dir).unwrap();
        let stored_at = SystemTime::now() - Duration::from_secs(120);
        let e = entry("MSFT", stored_at);
        store.save(&e).unwrap();

        assert!(dir.join("MSFT_compact.json").exists());
        assert!(!dir.join("MSFT_compact.json.tmp").exists());

        let loaded = store.load(&e.key).unwrap();
        assert_eq!(loaded.payload, e.payload);
        let skew = loaded
            .stored_at
            .duration_since(stored_at)
            .unwrap_or_else(|e| e.duration());
        assert!(skew < Duration::from_secs(2), "mtime skew {skew:?}");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn file_store_missing_or_corrupt_is_a_miss() {
        let dir = temp_dir("corrupt");
        let store = FileStore::open(&dir).unwrap();
        let key = CacheKey::new("BAD", OutputSize::Full);
        assert!(store.load(&key).is_none());

        std::fs::write(store.artifact_path(&key), b"{not json").unwrap();
        assert!(store.load(&key).is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
