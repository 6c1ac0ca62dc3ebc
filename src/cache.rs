//! Keyed table cache with atomic swap on rebuild.
//!
//! A [`TableCache`] holds at most one built table, tagged with the key it
//! was built from. Asking for a different key builds a new table and swaps
//! it in atomically:
//! - readers that already loaded the old table finish against it
//! - the old table is freed once the last reader drops it
//! - a failed build leaves the cached table untouched

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use quick_cache::sync::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::addr::parse_ipv4;
use crate::error::{Error, Result};
use crate::source::{FileSource, TableSource};
use crate::table::{MalformedLinePolicy, RangeEntry, RangeTable, RangeTableBuilder};

/// Default result cache capacity (number of addresses).
const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Configuration for [`TableCache`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached lookup results.
    pub result_cache_capacity: usize,
    /// Whether to cache lookup results per address.
    pub result_cache_enabled: bool,
    /// How malformed reference lines are handled during a build.
    pub line_policy: MalformedLinePolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            result_cache_capacity: DEFAULT_CACHE_CAPACITY,
            result_cache_enabled: true,
            line_policy: MalformedLinePolicy::Abort,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration with the specified result cache capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            result_cache_capacity: capacity,
            ..Self::default()
        }
    }

    /// Create a configuration with result caching disabled.
    pub fn no_cache() -> Self {
        Self {
            result_cache_capacity: 0,
            result_cache_enabled: false,
            ..Self::default()
        }
    }

    /// Set the malformed line policy.
    pub fn line_policy(mut self, policy: MalformedLinePolicy) -> Self {
        self.line_policy = policy;
        self
    }
}

/// A built table together with the key it came from.
#[derive(Debug)]
pub struct LoadedTable {
    key: String,
    table: RangeTable,
    generation: u64,
}

impl LoadedTable {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn table(&self) -> &RangeTable {
        &self.table
    }

    /// Cache generation this table was installed under.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Cache of one range table keyed by reference identifier.
///
/// # Example
///
/// ```no_run
/// use ipcountry::TableCache;
///
/// let cache = TableCache::new();
///
/// // First call builds the table from the file, later calls reuse it
/// let country = cache.resolve("10.0.0.5", "/data/ranges.csv")?;
///
/// // A different identifier replaces the cached table
/// let country = cache.resolve("10.0.0.5", "/data/ranges-v2.csv.gz")?;
/// # Ok::<(), ipcountry::Error>(())
/// ```
pub struct TableCache<S = FileSource> {
    source: S,
    config: CacheConfig,
    /// Current table, replaced atomically on rebuild.
    current: ArcSwapOption<LoadedTable>,
    /// Serializes builds so a key is built once under contention.
    build_lock: Mutex<()>,
    /// Lookup results keyed by (generation, address).
    results: Option<Cache<(u64, u32), Option<Arc<str>>>>,
    generation: AtomicU64,
}

impl TableCache<FileSource> {
    /// Create a cache reading reference files from disk, with default
    /// configuration.
    pub fn new() -> Self {
        Self::with_source(FileSource, CacheConfig::default())
    }

    /// Create a file-backed cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_source(FileSource, config)
    }
}

impl Default for TableCache<FileSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TableSource> TableCache<S> {
    /// Create a cache over a custom source.
    pub fn with_source(source: S, config: CacheConfig) -> Self {
        let results = if config.result_cache_enabled && config.result_cache_capacity > 0 {
            Some(Cache::new(config.result_cache_capacity))
        } else {
            None
        };

        Self {
            source,
            config,
            current: ArcSwapOption::empty(),
            build_lock: Mutex::new(()),
            results,
            generation: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the table for `key`, building it first if the cache holds
    /// nothing or a table for another key.
    pub fn get_or_build(&self, key: &str) -> Result<Arc<LoadedTable>> {
        if let Some(loaded) = self.cached(key) {
            return Ok(loaded);
        }

        let _guard = self.build_lock.lock();
        // Another caller may have built it while we waited
        if let Some(loaded) = self.cached(key) {
            return Ok(loaded);
        }

        self.build_and_swap(key)
    }

    /// Table currently held, whatever its key.
    pub fn current(&self) -> Option<Arc<LoadedTable>> {
        self.current.load_full()
    }

    /// Key of the table currently held.
    pub fn current_key(&self) -> Option<String> {
        self.current.load_full().map(|t| t.key.clone())
    }

    /// Drop the cached table. The next lookup rebuilds from the source.
    pub fn invalidate(&self) {
        let _guard = self.build_lock.lock();
        if let Some(old) = self.current.swap(None) {
            log::debug!("Invalidated range table for {}", old.key);
        }
        self.clear_results();
    }

    /// Rebuild the table for the currently cached key.
    ///
    /// Returns `Ok(false)` when nothing is cached. On failure the old table
    /// stays in place.
    pub fn reload(&self) -> Result<bool> {
        let _guard = self.build_lock.lock();
        let key = match self.current.load_full() {
            Some(loaded) => loaded.key.clone(),
            None => return Ok(false),
        };

        self.build_and_swap(&key)?;
        Ok(true)
    }

    /// Resolve a dotted-quad address against the table for `key`.
    ///
    /// `Ok(None)` means the address is valid but no range encloses it.
    pub fn resolve(&self, ip: &str, key: &str) -> Result<Option<Arc<str>>> {
        let addr = parse_ipv4(ip).map_err(|source| Error::InvalidAddress {
            input: ip.to_string(),
            source,
        })?;
        self.resolve_addr(addr, key)
    }

    /// Resolve a numeric address against the table for `key`.
    pub fn resolve_addr(&self, addr: u32, key: &str) -> Result<Option<Arc<str>>> {
        let loaded = self.get_or_build(key)?;
        let cache_key = (loaded.generation, addr);

        if let Some(ref cache) = self.results {
            if let Some(result) = cache.get(&cache_key) {
                return Ok(result);
            }
        }

        let result = loaded.table.lookup().find(addr).map(RangeEntry::country_arc);

        if let Some(ref cache) = self.results {
            cache.insert(cache_key, result.clone());
        }

        Ok(result)
    }

    /// Clear cached lookup results, keeping the table.
    pub fn clear_results(&self) {
        if let Some(ref cache) = self.results {
            cache.clear();
        }
    }

    /// Get result cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        if let Some(ref cache) = self.results {
            CacheStats {
                capacity: self.config.result_cache_capacity,
                len: cache.len(),
                enabled: true,
            }
        } else {
            CacheStats {
                capacity: 0,
                len: 0,
                enabled: false,
            }
        }
    }

    /// Number of successful builds so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn cached(&self, key: &str) -> Option<Arc<LoadedTable>> {
        self.current.load_full().filter(|loaded| loaded.key == key)
    }

    /// Build a table for `key` and install it. Caller holds `build_lock`.
    fn build_and_swap(&self, key: &str) -> Result<Arc<LoadedTable>> {
        let table = match self.build(key) {
            Ok(table) => table,
            Err(e) => {
                log::error!("Failed to build range table from {}: {}", key, e);
                return Err(e);
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let loaded = Arc::new(LoadedTable {
            key: key.to_string(),
            table,
            generation,
        });

        self.current.store(Some(Arc::clone(&loaded)));
        self.clear_results();

        log::info!(
            "Loaded {} ranges from {} (generation {})",
            loaded.table.len(),
            key,
            generation
        );

        Ok(loaded)
    }

    fn build(&self, key: &str) -> Result<RangeTable> {
        let reader = self
            .source
            .open(key)
            .map_err(|source| Error::SourceUnavailable {
                key: key.to_string(),
                source,
            })?;

        RangeTableBuilder::new()
            .with_policy(self.config.line_policy)
            .read_from(reader, key)
    }
}

/// Result cache statistics.
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    /// Maximum cache capacity.
    pub capacity: usize,
    /// Current number of entries in the cache.
    pub len: usize,
    /// Whether caching is enabled.
    pub enabled: bool,
}
