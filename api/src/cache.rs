//! Read-through byte cache for fetched pages, keyed by a hash of the URL.
//!
//! Entries are created on the first miss and never expire; delete the cache
//! directory to force a refetch.
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

pub const DEFAULT_CACHE_DIR: &str = "./cache";

#[derive(Debug)]
pub enum CacheError {
    NotFound(String),
    Io(io::Error, PathBuf),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::NotFound(key) => write!(f, "no cache entry for {key}"),
            CacheError::Io(e, path) => write!(f, "cache I/O error at {}: {e}", path.display()),
        }
    }
}

impl std::error::Error for CacheError {}

pub trait ByteCache {
    fn get(&self, key: &str) -> Result<Vec<u8>, CacheError>;
    fn put(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;
}

/// Stable cache key for a URL: lowercase hex SHA-256 of its bytes.
pub fn cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

/// Return the cached body for `url`, or call `fetch` and store what it returns.
pub fn read_through<E, F>(cache: &dyn ByteCache, url: &str, fetch: F) -> Result<Vec<u8>, E>
where
    F: FnOnce() -> Result<Vec<u8>, E>,
    E: From<CacheError>,
{
    let key = cache_key(url);
    match cache.get(&key) {
        Ok(bytes) => {
            log::debug!("cache hit for {url}");
            Ok(bytes)
        }
        Err(CacheError::NotFound(_)) => {
            log::debug!("cache miss for {url}");
            let bytes = fetch()?;
            cache.put(&key, &bytes)?;
            Ok(bytes)
        }
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Directory-backed cache
// ---------------------------------------------------------------------------

/// One file per entry, named by key, inside `dir`.
#[derive(Debug, Clone)]
pub struct DirCache {
    dir: PathBuf,
}

impl Default for DirCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DIR)
    }
}

impl DirCache {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl ByteCache for DirCache {
    fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        let path = self.entry_path(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(CacheError::NotFound(key.to_owned())),
            Err(e) => Err(CacheError::Io(e, path)),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|e| CacheError::Io(e, self.dir.clone()))?;
        let path = self.entry_path(key);
        fs::write(&path, value).map_err(|e| CacheError::Io(e, path))
    }
}

// ---------------------------------------------------------------------------
// In-memory cache
// ---------------------------------------------------------------------------

/// Process-local, single-threaded cache. Nothing survives the run.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RefCell<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ByteCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        self.entries
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(key.to_owned()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn cache_key_is_stable_hex_sha256() {
        let key = cache_key("http://www.nhl.com/ice/standings.htm");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(key, cache_key("http://www.nhl.com/ice/standings.htm"));
        assert_ne!(key, cache_key("http://www.nhl.com/ice/schedulebyseason.htm"));
    }

    #[test]
    fn dir_cache_missing_entry_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = DirCache::new(tmp.path().join("pages"));
        assert!(matches!(cache.get("abc"), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn dir_cache_creates_directory_on_put() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("pages");
        let cache = DirCache::new(&dir);
        cache.put("abc", b"<html/>").unwrap();
        assert!(dir.is_dir());
        assert_eq!(cache.get("abc").unwrap(), b"<html/>");
    }

    #[test]
    fn read_through_fetches_once() {
        let cache = MemoryCache::new();
        let calls = Cell::new(0);
        let fetch = || {
            calls.set(calls.get() + 1);
            Ok::<_, CacheError>(b"body".to_vec())
        };

        let first = read_through(&cache, "http://x/page", fetch).unwrap();
        let second = read_through(&cache, "http://x/page", fetch).unwrap();

        assert_eq!(first, b"body");
        assert_eq!(second, b"body");
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn memory_cache_put_is_visible_and_overwrites() {
        let cache = MemoryCache::new();
        assert!(matches!(cache.get("k"), Err(CacheError::NotFound(_))));

        cache.put("k", b"one").unwrap();
        cache.put("k", b"two").unwrap();
        cache.put("other", b"x").unwrap();

        assert_eq!(cache.get("k").unwrap(), b"two");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn read_through_does_not_store_failed_fetch() {
        let cache = MemoryCache::new();
        let result = read_through(&cache, "http://x/page", || {
            Err::<Vec<u8>, _>(CacheError::NotFound("upstream".into()))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
