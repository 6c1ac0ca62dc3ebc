//! Process-wide cache and the two-argument resolve entry point.

use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::cache::TableCache;
use crate::error::Result;

/// Global table cache, reading reference files from disk.
static GLOBAL_CACHE: Lazy<TableCache> = Lazy::new(TableCache::new);

/// Resolve an IPv4 address to a country using the reference file at
/// `reference`.
///
/// The table for `reference` is built on first use and reused until a
/// call names a different reference file, at which point it is rebuilt.
///
/// # Examples
/// ```no_run
/// match ipcountry::resolve("10.0.0.5", "/data/ranges.csv")? {
///     Some(country) => println!("{}", country),
///     None => println!("unknown"),
/// }
/// # Ok::<(), ipcountry::Error>(())
/// ```
pub fn resolve(ip: &str, reference: &str) -> Result<Option<Arc<str>>> {
    GLOBAL_CACHE.resolve(ip, reference)
}

/// Drop the globally cached table.
pub fn invalidate() {
    GLOBAL_CACHE.invalidate();
}

/// The process-wide cache behind [`resolve`].
pub fn global_cache() -> &'static TableCache {
    &GLOBAL_CACHE
}
