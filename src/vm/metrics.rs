use crate::utils::sync::{AtomicU64, Ordering};
use serde::Serialize;

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct CacheStat {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub size: usize,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub thunk: CacheStat,
    pub specialization: CacheStat,
    pub proxy_type: CacheStat,
    pub thunk_compilations: u64,
    pub proxy_types_built: u64,
    pub intercepted_calls: u64,
    pub pass_through_calls: u64,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cache Statistics:")?;
        writeln!(f, "  Thunk Cache:            {}", self.thunk)?;
        writeln!(f, "  Specialization Cache:   {}", self.specialization)?;
        writeln!(f, "  Proxy Type Cache:       {}", self.proxy_type)?;
        writeln!(f, "Thunks compiled:          {:>8}", self.thunk_compilations)?;
        writeln!(f, "Proxy types built:        {:>8}", self.proxy_types_built)?;
        writeln!(f, "Intercepted calls:        {:>8}", self.intercepted_calls)?;
        writeln!(f, "Pass-through calls:       {:>8}", self.pass_through_calls)?;
        Ok(())
    }
}

impl std::fmt::Display for CacheStat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hits: {:>8}, misses: {:>8}, hit_rate: {:>6.2}%, size: {:>8}",
            self.hits,
            self.misses,
            self.hit_rate * 100.0,
            self.size
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheSizes {
    pub thunk_size: usize,
    pub proxy_type_size: usize,
}

/// Metrics counters.
///
/// All counters use `Ordering::Relaxed`; they are independent and only need
/// to be updated atomically.
#[derive(Debug, Default)]
pub struct RuntimeMetrics {
    /// Thunks produced by the compiler, cached or not
    pub thunk_compilations: AtomicU64,
    pub thunk_cache_hits: AtomicU64,
    pub thunk_cache_misses: AtomicU64,
    pub specialization_cache_hits: AtomicU64,
    pub specialization_cache_misses: AtomicU64,
    /// Proxy types minted by the synthesizer
    pub proxy_types_built: AtomicU64,
    pub proxy_type_cache_hits: AtomicU64,
    pub proxy_type_cache_misses: AtomicU64,
    pub intercepted_calls: AtomicU64,
    pub pass_through_calls: AtomicU64,
}

impl RuntimeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_thunk_compilation(&self) {
        self.thunk_compilations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_thunk_cache_hit(&self) {
        self.thunk_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_thunk_cache_miss(&self) {
        self.thunk_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_specialization_cache_hit(&self) {
        self.specialization_cache_hits
            .fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_specialization_cache_miss(&self) {
        self.specialization_cache_misses
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_proxy_type_built(&self) {
        self.proxy_types_built.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_proxy_type_cache_hit(&self) {
        self.proxy_type_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_proxy_type_cache_miss(&self) {
        self.proxy_type_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_intercepted_call(&self) {
        self.intercepted_calls.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_pass_through_call(&self) {
        self.pass_through_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn thunk_compilations(&self) -> u64 {
        self.thunk_compilations.load(Ordering::Relaxed)
    }

    pub fn cache_statistics(&self, sizes: CacheSizes) -> CacheStats {
        let specialization_misses = self.specialization_cache_misses.load(Ordering::Relaxed);
        CacheStats {
            thunk: self.stat(
                self.thunk_cache_hits.load(Ordering::Relaxed),
                self.thunk_cache_misses.load(Ordering::Relaxed),
                sizes.thunk_size,
            ),
            // every miss inserts exactly one specialization
            specialization: self.stat(
                self.specialization_cache_hits.load(Ordering::Relaxed),
                specialization_misses,
                specialization_misses as usize,
            ),
            proxy_type: self.stat(
                self.proxy_type_cache_hits.load(Ordering::Relaxed),
                self.proxy_type_cache_misses.load(Ordering::Relaxed),
                sizes.proxy_type_size,
            ),
            thunk_compilations: self.thunk_compilations(),
            proxy_types_built: self.proxy_types_built.load(Ordering::Relaxed),
            intercepted_calls: self.intercepted_calls.load(Ordering::Relaxed),
            pass_through_calls: self.pass_through_calls.load(Ordering::Relaxed),
        }
    }

    fn stat(&self, hits: u64, misses: u64, size: usize) -> CacheStat {
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };
        CacheStat {
            hits,
            misses,
            hit_rate,
            size,
        }
    }
}
