//! In-process counters for cache and translation behaviour.
//!
//! One `FaqMetrics` is created at startup and shared between the
//! translation gateway and the FAQ service; `/health` reports a snapshot.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct FaqMetrics {
    /// Reads answered from the cache
    cache_hits: AtomicUsize,

    /// Reads that had to go to the record store
    cache_misses: AtomicUsize,

    /// Cache operations that failed and were bypassed
    cache_errors: AtomicUsize,

    /// Calls to the external translator that produced a translation
    translations: AtomicUsize,

    /// Calls to the external translator that fell back to the base text
    translation_fallbacks: AtomicUsize,
}

impl FaqMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_error(&self) {
        self.cache_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_translation(&self) {
        self.translations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_translation_fallback(&self) {
        self.translation_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of the current counters.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let total_reads = hits + misses;
        let cache_hit_rate = if total_reads > 0 {
            (hits as f64 / total_reads as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            cache_errors: self.cache_errors.load(Ordering::Relaxed),
            translations: self.translations.load(Ordering::Relaxed),
            translation_fallbacks: self.translation_fallbacks.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Percentage (0-100)
    pub cache_hit_rate: f64,

    pub cache_errors: usize,
    pub translations: usize,
    pub translation_fallbacks: usize,
}
