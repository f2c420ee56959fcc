//! Compilation caching.
//!
//! Wraps a [`PredicateCompiler`] with an LRU cache with TTL expiration.
//! Conditions are keyed by their value tree, value types included, plus the
//! options of every field they reference, so structurally equal conditions
//! share one entry.

use std::collections::BTreeSet;
use std::fmt::Write;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use search_condition::{SearchCondition, ValuesGroup};
use tracing::debug;

use crate::compiler::PredicateCompiler;
use crate::config::CacheConfig;
use crate::error::CompileResult;
use crate::result::CompiledPredicate;

/// A cached predicate with expiration tracking.
#[derive(Debug, Clone)]
struct CacheEntry {
    predicate: CompiledPredicate,
    created_at: Instant,
}

impl CacheEntry {
    fn new(predicate: CompiledPredicate) -> Self {
        Self {
            predicate,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// Thread-safe caching front for a [`PredicateCompiler`].
///
/// - **LRU eviction**: when full, the least recently used entry is evicted.
/// - **TTL expiration**: entries expire after the configured time-to-live.
/// - **Thread-safe**: one instance can be shared between threads.
///
/// # Example
///
/// ```rust
/// use search_condition::{FieldSet, FieldType, SearchConditionBuilder};
/// use search_condition_sql::{CachedCompiler, ColumnMap, PredicateCompiler};
///
/// let fields = FieldSet::builder().add("id", FieldType::Integer).build_shared();
/// let mut columns = ColumnMap::new();
/// columns.set_field("id", "id", None, None);
///
/// let cached = CachedCompiler::new(PredicateCompiler::new(columns));
/// let condition = SearchConditionBuilder::new(fields)
///     .field("id", |bag| bag.simple(1))
///     .build()?;
///
/// cached.compile(&condition)?;
/// cached.compile(&condition)?;
///
/// let stats = cached.stats();
/// assert_eq!((stats.hits, stats.misses), (1, 1));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct CachedCompiler {
    compiler: PredicateCompiler,
    inner: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedCompiler {
    /// Wraps `compiler`, using its cache configuration or the default one.
    pub fn new(compiler: PredicateCompiler) -> Self {
        let config = compiler.config().cache.clone().unwrap_or_default();
        Self::with_cache_config(compiler, config)
    }

    /// Wraps `compiler` with an explicit cache configuration.
    ///
    /// # Arguments
    ///
    /// * `compiler` - The compiler to delegate misses to
    /// * `config` - Cache size and TTL; a size of zero is treated as one
    pub fn with_cache_config(compiler: PredicateCompiler, config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            compiler,
            inner: Mutex::new(LruCache::new(capacity)),
            ttl: config.ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the wrapped compiler.
    pub fn compiler(&self) -> &PredicateCompiler {
        &self.compiler
    }

    /// Compiles a condition, serving repeated conditions from the cache.
    ///
    /// Errors are never cached.
    pub fn compile(&self, condition: &SearchCondition) -> CompileResult<CompiledPredicate> {
        let key = cache_key(condition);

        if let Some(predicate) = self.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "predicate cache hit");
            return Ok(predicate);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "predicate cache miss");

        let predicate = self.compiler.compile(condition)?;
        self.inner.lock().put(key, CacheEntry::new(predicate.clone()));
        Ok(predicate)
    }

    /// Cached counterpart of [`PredicateCompiler::where_clause`].
    pub fn where_clause(&self, condition: &SearchCondition, prefix: &str) -> CompileResult<String> {
        Ok(self.compile(condition)?.with_prefix(prefix))
    }

    fn get(&self, key: &str) -> Option<CompiledPredicate> {
        let mut cache = self.inner.lock();
        let entry = cache.get(key)?;
        if entry.is_expired(self.ttl) {
            cache.pop(key);
            return None;
        }
        Some(entry.predicate.clone())
    }

    /// Returns the number of cached entries, expired ones included.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all entries. Hit and miss counters are kept.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Removes expired entries.
    pub fn cleanup_expired(&self) {
        let mut cache = self.inner.lock();
        let expired: Vec<String> = cache
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.ttl))
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            cache.pop(&key);
        }
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

/// Everything compilation reads from a condition: the value tree with its
/// `Debug` form (which keeps value types and full precision) and the options
/// of each referenced field.
fn cache_key(condition: &SearchCondition) -> String {
    let group = condition.values_group();
    let mut names = BTreeSet::new();
    collect_field_names(group, &mut names);

    let mut key = format!("{:?}", group);
    for name in names {
        match condition.field_set().get(name) {
            Ok(config) => {
                let _ = write!(key, "|{:?}={:?}", name, config.options());
            }
            Err(_) => {
                let _ = write!(key, "|{:?}", name);
            }
        }
    }
    key
}

fn collect_field_names<'g>(group: &'g ValuesGroup, names: &mut BTreeSet<&'g str>) {
    names.extend(group.fields().keys().map(String::as_str));
    for child in group.groups() {
        collect_field_names(child, names);
    }
}

impl std::fmt::Debug for CachedCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedCompiler")
            .field("compiler", &self.compiler)
            .field("stats", &self.stats())
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that had to compile.
    pub misses: u64,
    /// Entries currently cached.
    pub entries: usize,
}
