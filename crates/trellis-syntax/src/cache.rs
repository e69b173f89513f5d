use crate::compiler::{CompileOptions, load_grammar};
use crate::rule::Grammar;
use anyhow::Result;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tracing::debug;

const DEFAULT_CAPACITY: usize = 32;

#[derive(Debug, Clone)]
struct CacheEntry {
    grammar: Arc<Grammar>,
    mtime: SystemTime,
    size: u64,
    hash: u64,
}

/// Compiled grammars keyed by file path.
///
/// An entry is reused only while the file's size, mtime and content hash are
/// unchanged. The least recently used entry is evicted when full.
pub struct GrammarCache {
    cache: Mutex<LruCache<PathBuf, CacheEntry>>,
    options: CompileOptions,
    max_entries: usize,
}

impl GrammarCache {
    pub fn new(max_entries: usize, options: CompileOptions) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            options,
            max_entries: capacity.get(),
        }
    }

    /// Capacity from `TRELLIS_GRAMMAR_CACHE_SIZE`, falling back to 32.
    pub fn with_default_size(options: CompileOptions) -> Self {
        let max_entries = std::env::var("TRELLIS_GRAMMAR_CACHE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CAPACITY);
        Self::new(max_entries, options)
    }

    /// Returns the cached grammar for `path`, compiling it if missing or stale.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<Grammar>> {
        if let Some(grammar) = self.get(path) {
            debug!(path = %path.display(), "grammar cache hit");
            return Ok(grammar);
        }

        debug!(path = %path.display(), "grammar cache miss");
        let grammar = Arc::new(load_grammar(path, &self.options)?);
        self.insert(path.to_path_buf(), Arc::clone(&grammar));
        Ok(grammar)
    }

    /// Cached grammar for `path`, if the file has not changed since it was loaded.
    pub fn get(&self, path: &Path) -> Option<Arc<Grammar>> {
        let mut cache = self.cache.lock().ok()?;
        let entry = cache.get(path)?;

        let metadata = std::fs::metadata(path).ok()?;
        let current_mtime = metadata.modified().ok()?;
        if entry.size != metadata.len() || entry.mtime != current_mtime {
            return None;
        }

        let content = std::fs::read_to_string(path).ok()?;
        if Self::hash_content(&content) != entry.hash {
            return None;
        }

        Some(Arc::clone(&entry.grammar))
    }

    fn insert(&self, path: PathBuf, grammar: Arc<Grammar>) {
        let Ok(metadata) = std::fs::metadata(&path) else {
            return;
        };
        let Ok(mtime) = metadata.modified() else {
            return;
        };
        let Ok(content) = std::fs::read_to_string(&path) else {
            return;
        };

        let entry = CacheEntry {
            grammar,
            mtime,
            size: metadata.len(),
            hash: Self::hash_content(&content),
        };

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(path, entry);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    pub fn invalidate(&self, path: &Path) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.pop(path);
        }
    }

    pub fn stats(&self) -> CacheStats {
        let cache = self.cache.lock().ok();
        CacheStats {
            entries: cache.as_ref().map(|c| c.len()).unwrap_or(0),
            max_entries: self.max_entries,
        }
    }

    fn hash_content(content: &str) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for GrammarCache {
    fn default() -> Self {
        Self::with_default_size(CompileOptions::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub max_entries: usize,
}
