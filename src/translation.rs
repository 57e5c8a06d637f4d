use crate::i18n::Language;
use crate::metrics::FaqMetrics;
use crate::models::LocalizedText;
use crate::retry::{with_retry_if, RetryConfig};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("translation API error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed translation response: {0}")]
    Malformed(String),
}

impl TranslationError {
    /// Network failures, 429 and 5xx are worth retrying; other 4xx are not.
    fn is_retryable(&self) -> bool {
        match self {
            TranslationError::Http(_) => true,
            TranslationError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            TranslationError::Malformed(_) => false,
        }
    }
}

/// An external text-translation capability.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate English `text` into `target`.
    async fn translate(&self, text: &str, target: Language) -> Result<String, TranslationError>;
}

/// Client for the public Google Translate endpoint.
pub struct GoogleTranslator {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl GoogleTranslator {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryConfig::translation(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn request_once(&self, text: &str, target: Language) -> Result<String, TranslationError> {
        let response = self
            .client
            .get(format!("{}/translate_a/single", self.base_url))
            .query(&[
                ("client", "gtx"),
                ("sl", Language::canonical().code()),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(TranslationError::Status { status, body });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TranslationError::Malformed(e.to_string()))?;

        parse_translation(&body)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target: Language) -> Result<String, TranslationError> {
        with_retry_if(
            &self.retry,
            &format!("Translation to {}", target.name()),
            || self.request_once(text, target),
            TranslationError::is_retryable,
        )
        .await
    }
}

/// Extract the translated text from a `translate_a/single` response.
///
/// The response is a nested array whose first element lists sentence
/// segments as `[translated, original, ...]`.
fn parse_translation(body: &Value) -> Result<String, TranslationError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::Malformed("missing segment list".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(TranslationError::Malformed(
            "response contained no translated text".to_string(),
        ));
    }

    Ok(translated)
}

/// Result of a best-effort translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    Translated(String),
    /// The upstream call failed; `original` is the untranslated input.
    Fallback { original: String, cause: String },
}

impl TranslationOutcome {
    pub fn is_translated(&self) -> bool {
        matches!(self, TranslationOutcome::Translated(_))
    }

    /// The text to show a reader: the translation, or the original on fallback.
    pub fn into_text(self) -> String {
        match self {
            TranslationOutcome::Translated(text) => text,
            TranslationOutcome::Fallback { original, .. } => original,
        }
    }
}

/// Paces and guards calls to a [`Translator`].
///
/// Never fails: upstream errors are logged and reported as
/// [`TranslationOutcome::Fallback`].
#[derive(Clone)]
pub struct TranslationGateway {
    translator: Arc<dyn Translator>,
    pacing: Duration,
    metrics: Arc<FaqMetrics>,
}

impl TranslationGateway {
    pub fn new(translator: Arc<dyn Translator>, pacing: Duration, metrics: Arc<FaqMetrics>) -> Self {
        Self {
            translator,
            pacing,
            metrics,
        }
    }

    pub async fn translate(&self, text: &str, target: Language) -> TranslationOutcome {
        if target.is_canonical() || text.trim().is_empty() {
            return TranslationOutcome::Translated(text.to_string());
        }

        // Upstream rate limit
        if !self.pacing.is_zero() {
            sleep(self.pacing).await;
        }

        match self.translator.translate(text, target).await {
            Ok(translated) => {
                debug!("Translated {} chars into {}", text.len(), target.code());
                self.metrics.record_translation();
                TranslationOutcome::Translated(translated)
            }
            Err(e) => {
                warn!(
                    "Translation into {} ({}) failed, using original text: {}",
                    target.name(),
                    target.code(),
                    e
                );
                self.metrics.record_translation_fallback();
                TranslationOutcome::Fallback {
                    original: text.to_string(),
                    cause: e.to_string(),
                }
            }
        }
    }

    /// Translate a question and its answer concurrently.
    ///
    /// Returns `None` unless both halves were translated, so a half-translated
    /// pair never reaches the store.
    pub async fn translate_content(
        &self,
        content: &LocalizedText,
        target: Language,
    ) -> Option<LocalizedText> {
        let (question, answer) = tokio::join!(
            self.translate(&content.question, target),
            self.translate(&content.answer, target),
        );

        if !(question.is_translated() && answer.is_translated()) {
            return None;
        }

        LocalizedText::new(&question.into_text(), &answer.into_text()).ok()
    }
}
