//! FAQ synchronization: keeps the record store, the translations and the
//! per-language cached projections consistent with each other.
//!
//! Writes translate base content into every target language concurrently,
//! persist the record and then drop every cached projection. Reads are
//! served from the cache when possible and repopulate it on a miss.

use crate::cache::{faq_list_key, FaqCache, FAQ_KEY_PREFIX};
use crate::db::FaqStore;
use crate::error::{FaqError, FaqResult};
use crate::i18n::Language;
use crate::metrics::{FaqMetrics, MetricsReport};
use crate::models::{FaqRecord, FaqView, LocalizedText, NewFaq, Translations};
use crate::translation::TranslationGateway;
use futures::future::join_all;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Lifetime of a cached per-language FAQ list.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Where a list of FAQs was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Database,
}

/// FAQs projected into one language.
#[derive(Debug, Clone, PartialEq)]
pub struct FaqList {
    pub faqs: Vec<FaqView>,
    pub source: Source,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub store: &'static str,
    pub cache: &'static str,
    pub metrics: MetricsReport,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.store == "ok"
    }
}

pub struct FaqService {
    store: Arc<dyn FaqStore>,
    cache: Arc<dyn FaqCache>,
    gateway: TranslationGateway,
    metrics: Arc<FaqMetrics>,
    cache_ttl: Duration,
    /// Bumped by every write before the cached lists are dropped.
    generation: AtomicU64,
}

impl FaqService {
    pub fn new(
        store: Arc<dyn FaqStore>,
        cache: Arc<dyn FaqCache>,
        gateway: TranslationGateway,
        metrics: Arc<FaqMetrics>,
    ) -> Self {
        Self {
            store,
            cache,
            gateway,
            metrics,
            cache_ttl: DEFAULT_CACHE_TTL,
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Create an FAQ, translating it into every target language first.
    ///
    /// Languages whose translation failed are left out of the record.
    pub async fn create(&self, question: &str, answer: &str) -> FaqResult<FaqRecord> {
        let base = LocalizedText::new(question, answer)?;

        let mut translations = Translations::new();
        for (language, translated) in self.translate_all(&base).await {
            if let Some(text) = translated {
                translations.set(language, text)?;
            }
        }

        let record = self.store.create(NewFaq { base, translations }).await?;
        info!(
            "Created FAQ {} with {} translation(s)",
            record.id,
            record.translations.len()
        );

        self.invalidate_projections().await;
        Ok(record)
    }

    /// List every FAQ in `language`, newest first.
    pub async fn list(&self, language: Language) -> FaqResult<FaqList> {
        let key = faq_list_key(language.code());

        if let Some(faqs) = self.cached_list(&key).await {
            self.metrics.record_cache_hit();
            return Ok(FaqList {
                faqs,
                source: Source::Cache,
            });
        }
        self.metrics.record_cache_miss();

        let generation = self.generation.load(Ordering::SeqCst);
        let faqs: Vec<FaqView> = self
            .store
            .list()
            .await?
            .iter()
            .map(|record| record.project(language))
            .collect();

        self.fill_cache(&key, &faqs, generation).await;

        Ok(FaqList {
            faqs,
            source: Source::Database,
        })
    }

    /// Update an FAQ.
    ///
    /// With the canonical language this replaces the base content and
    /// re-translates it; a language whose translation fails keeps its
    /// previous entry. With any other language only that language's
    /// translation is overwritten.
    pub async fn update(
        &self,
        id: i64,
        question: &str,
        answer: &str,
        language: Language,
    ) -> FaqResult<FaqRecord> {
        let mut record = self.store.find(id).await?.ok_or(FaqError::NotFound(id))?;
        let content = LocalizedText::new(question, answer)?;

        if language.is_canonical() {
            for (target, translated) in self.translate_all(&content).await {
                match translated {
                    Some(text) => record.translations.set(target, text)?,
                    None => debug!("Keeping previous {} translation of FAQ {}", target, id),
                }
            }
            record.question = content.question;
            record.answer = content.answer;
        } else {
            record.translations.set(language, content)?;
        }

        let updated = self
            .store
            .update(&record)
            .await?
            .ok_or(FaqError::NotFound(id))?;
        info!("Updated FAQ {} ({})", id, language);

        self.invalidate_projections().await;
        Ok(updated)
    }

    /// Delete an FAQ, returning the record as it was.
    pub async fn delete(&self, id: i64) -> FaqResult<FaqRecord> {
        let deleted = self.store.delete(id).await?.ok_or(FaqError::NotFound(id))?;
        info!("Deleted FAQ {}", id);

        self.invalidate_projections().await;
        Ok(deleted)
    }

    pub async fn health(&self) -> HealthReport {
        let store = match self.store.ping().await {
            Ok(()) => "ok",
            Err(e) => {
                warn!("Record store health check failed: {}", e);
                "unavailable"
            }
        };
        let cache = match self.cache.ping().await {
            Ok(()) => "ok",
            Err(e) => {
                warn!("Cache health check failed: {}", e);
                "unavailable"
            }
        };

        HealthReport {
            store,
            cache,
            metrics: self.metrics.report(),
        }
    }

    /// Translate `base` into every target language concurrently.
    ///
    /// Each language is attempted independently; a failed language yields
    /// `None` without affecting the others.
    async fn translate_all(&self, base: &LocalizedText) -> Vec<(Language, Option<LocalizedText>)> {
        join_all(Language::targets().map(|language| async move {
            (language, self.gateway.translate_content(base, language).await)
        }))
        .await
    }

    /// Read a cached list, treating cache errors and unreadable payloads as
    /// misses.
    async fn cached_list(&self, key: &str) -> Option<Vec<FaqView>> {
        let payload = match self.cache.get(key).await {
            Ok(payload) => payload?,
            Err(e) => {
                self.metrics.record_cache_error();
                warn!("Cache unavailable, reading {} from store: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(faqs) => Some(faqs),
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Cache a list read from the store at `generation`.
    ///
    /// Skipped, or undone, when a write bumped the generation meanwhile.
    async fn fill_cache(&self, key: &str, faqs: &[FaqView], generation: u64) {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("FAQs changed while reading {}, not caching it", key);
            return;
        }

        let payload = match serde_json::to_string(faqs) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize {} for caching: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.cache.set_with_expiry(key, &payload, self.cache_ttl).await {
            self.metrics.record_cache_error();
            warn!("Failed to cache {}: {}", key, e);
            return;
        }

        // A write may have invalidated between the check and the set
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("FAQs changed while caching {}, dropping it", key);
            if let Err(e) = self.cache.invalidate_prefix(key).await {
                self.metrics.record_cache_error();
                error!("Failed to drop stale cache entry {}: {}", key, e);
            }
        }
    }

    /// Drop every language's cached list; any write can change all of them.
    async fn invalidate_projections(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);

        match self.cache.invalidate_prefix(FAQ_KEY_PREFIX).await {
            Ok(removed) => debug!("Invalidated {} cached FAQ list(s)", removed),
            Err(e) => {
                self.metrics.record_cache_error();
                error!(
                    "Failed to invalidate cached FAQ lists, stale data may be served until expiry: {}",
                    e
                );
            }
        }
    }
}
