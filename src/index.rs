use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::codec;
use crate::error::Result;
use crate::trie::SuffixTrie;

/// Default LRU cache size
pub const DEFAULT_CACHE_SIZE: usize = 1024;

/// Frozen suffix trie with an LRU cache of lookup results.
///
/// The trie is never mutated once the index exists, so it is read without
/// locking; only the cache sits behind a mutex. Share it across threads
/// with `Arc<SuffixIndex>` or a plain reference.
pub struct SuffixIndex {
    trie: Arc<SuffixTrie>,
    cache: Mutex<LruCache<String, String>>,
}

impl SuffixIndex {
    /// Freeze `trie` into an index. A cache size of 0 is treated as 1.
    pub fn new(trie: SuffixTrie, cache_size: usize) -> Self {
        Self::from_shared(Arc::new(trie), cache_size)
    }

    /// Build an index over an already shared trie
    pub fn from_shared(trie: Arc<SuffixTrie>, cache_size: usize) -> Self {
        let cache_size = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            trie,
            cache: Mutex::new(LruCache::new(cache_size)),
        }
    }

    /// Build the trie from suffix rules, then freeze it
    pub fn from_rules<I, S>(rules: I, cache_size: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(rules.into_iter().collect(), cache_size)
    }

    /// Decode a JSON trie and freeze it
    pub fn from_json(bytes: &[u8], cache_size: usize) -> Result<Self> {
        Ok(Self::new(codec::decode(bytes)?, cache_size))
    }

    /// Same result as [`SuffixTrie::lookup`], served from the cache when
    /// the name was seen before.
    pub fn lookup(&self, name: &str) -> String {
        let mut cache = self.cache.lock();

        if let Some(cached) = cache.get(name) {
            return cached.clone();
        }

        // Lookup is a CPU-only walk, so computing under the lock is fine
        let result = self.trie.lookup(name).to_string();
        cache.put(name.to_string(), result.clone());
        result
    }

    /// The frozen trie
    pub fn trie(&self) -> &SuffixTrie {
        &self.trie
    }

    /// A shared handle to the frozen trie
    pub fn shared(&self) -> Arc<SuffixTrie> {
        Arc::clone(&self.trie)
    }

    /// Number of cached lookup results
    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}
