use crate::error::StoreError;
use crate::models::{FaqRecord, NewFaq, Translations};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::info;

/// Persistent storage for FAQ records.
#[async_trait]
pub trait FaqStore: Send + Sync {
    async fn create(&self, faq: NewFaq) -> Result<FaqRecord, StoreError>;

    /// All records, newest first.
    async fn list(&self) -> Result<Vec<FaqRecord>, StoreError>;

    async fn find(&self, id: i64) -> Result<Option<FaqRecord>, StoreError>;

    /// Replace content and translations of an existing record.
    ///
    /// Returns `None` if the record no longer exists.
    async fn update(&self, record: &FaqRecord) -> Result<Option<FaqRecord>, StoreError>;

    /// Delete a record, returning its state before deletion.
    async fn delete(&self, id: i64) -> Result<Option<FaqRecord>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Debug, FromRow)]
struct FaqRow {
    id: i64,
    question: String,
    answer: String,
    translations: Json<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FaqRow {
    /// Validate the stored translation map while converting.
    fn into_record(self) -> Result<FaqRecord, StoreError> {
        let translations: Translations =
            serde_json::from_value(self.translations.0).map_err(|e| StoreError::Corrupt {
                id: self.id,
                reason: e.to_string(),
            })?;

        Ok(FaqRecord {
            id: self.id,
            question: self.question,
            answer: self.answer,
            translations,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, question, answer, translations, created_at, updated_at";

/// PostgreSQL-backed record store.
#[derive(Clone)]
pub struct PgFaqStore {
    pool: PgPool,
}

impl PgFaqStore {
    /// Connect to PostgreSQL and create the schema if needed.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        info!("Connected to PostgreSQL");
        Ok(store)
    }

    /// Create tables (safe to run on every start).
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS faqs (
                id BIGSERIAL PRIMARY KEY,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                translations JSONB NOT NULL DEFAULT '{}'::jsonb,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS faqs_created_at_idx ON faqs (created_at DESC)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Close every pooled connection; further queries fail.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

#[async_trait]
impl FaqStore for PgFaqStore {
    async fn create(&self, faq: NewFaq) -> Result<FaqRecord, StoreError> {
        let row: FaqRow = sqlx::query_as(&format!(
            "INSERT INTO faqs (question, answer, translations)
             VALUES ($1, $2, $3)
             RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(&faq.base.question)
        .bind(&faq.base.answer)
        .bind(Json(&faq.translations))
        .fetch_one(&self.pool)
        .await?;

        row.into_record()
    }

    async fn list(&self) -> Result<Vec<FaqRecord>, StoreError> {
        let rows: Vec<FaqRow> = sqlx::query_as(&format!(
            "SELECT {} FROM faqs ORDER BY created_at DESC, id DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(FaqRow::into_record).collect()
    }

    async fn find(&self, id: i64) -> Result<Option<FaqRecord>, StoreError> {
        let row: Option<FaqRow> =
            sqlx::query_as(&format!("SELECT {} FROM faqs WHERE id = $1", SELECT_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(FaqRow::into_record).transpose()
    }

    async fn update(&self, record: &FaqRecord) -> Result<Option<FaqRecord>, StoreError> {
        let row: Option<FaqRow> = sqlx::query_as(&format!(
            "UPDATE faqs
             SET question = $2, answer = $3, translations = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(record.id)
        .bind(&record.question)
        .bind(&record.answer)
        .bind(Json(&record.translations))
        .fetch_optional(&self.pool)
        .await?;

        row.map(FaqRow::into_record).transpose()
    }

    async fn delete(&self, id: i64) -> Result<Option<FaqRecord>, StoreError> {
        let row: Option<FaqRow> = sqlx::query_as(&format!(
            "DELETE FROM faqs WHERE id = $1 RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(FaqRow::into_record).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-process record store with the same ordering and id semantics as
/// [`PgFaqStore`].
#[derive(Default)]
pub struct MemoryFaqStore {
    inner: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    records: BTreeMap<i64, FaqRecord>,
}

impl MemoryFaqStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl FaqStore for MemoryFaqStore {
    async fn create(&self, faq: NewFaq) -> Result<FaqRecord, StoreError> {
        let mut state = self.state();
        state.next_id += 1;
        let now = Utc::now();
        let record = FaqRecord {
            id: state.next_id,
            question: faq.base.question,
            answer: faq.base.answer,
            translations: faq.translations,
            created_at: now,
            updated_at: now,
        };
        state.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<FaqRecord>, StoreError> {
        let mut records: Vec<FaqRecord> = self.state().records.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn find(&self, id: i64) -> Result<Option<FaqRecord>, StoreError> {
        Ok(self.state().records.get(&id).cloned())
    }

    async fn update(&self, record: &FaqRecord) -> Result<Option<FaqRecord>, StoreError> {
        let mut state = self.state();
        let Some(existing) = state.records.get_mut(&record.id) else {
            return Ok(None);
        };

        existing.question = record.question.clone();
        existing.answer = record.answer.clone();
        existing.translations = record.translations.clone();
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: i64) -> Result<Option<FaqRecord>, StoreError> {
        Ok(self.state().records.remove(&id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;
    use crate::models::LocalizedText;

    // ==================== Helper Functions ====================

    fn new_faq(question: &str, answer: &str) -> NewFaq {
        NewFaq {
            base: LocalizedText::new(question, answer).unwrap(),
            translations: Translations::new(),
        }
    }

    // ==================== MemoryFaqStore Tests ====================

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store = MemoryFaqStore::new();

        let first = store.create(new_faq("Q1", "A1")).await.unwrap();
        let second = store.create(new_faq("Q2", "A2")).await.unwrap();

        assert!(second.id > first.id);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryFaqStore::new();
        store.create(new_faq("Q1", "A1")).await.unwrap();
        store.create(new_faq("Q2", "A2")).await.unwrap();
        store.create(new_faq("Q3", "A3")).await.unwrap();

        let questions: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.question)
            .collect();

        assert_eq!(questions, vec!["Q3", "Q2", "Q1"]);
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let store = MemoryFaqStore::new();
        assert!(store.find(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_content_and_bumps_timestamp() {
        let store = MemoryFaqStore::new();
        let mut record = store.create(new_faq("Q1", "A1")).await.unwrap();

        record.question = "Q1 edited".to_string();
        record
            .translations
            .set(Language::Hi, LocalizedText::new("hq", "ha").unwrap())
            .unwrap();
        let updated = store.update(&record).await.unwrap().expect("Should exist");

        assert_eq!(updated.question, "Q1 edited");
        assert!(updated.translations.contains(Language::Hi));
        assert!(updated.updated_at >= updated.created_at);
        assert_eq!(store.find(record.id).await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = MemoryFaqStore::new();
        let mut record = store.create(new_faq("Q1", "A1")).await.unwrap();
        store.delete(record.id).await.unwrap();

        record.question = "gone".to_string();
        assert!(store.update(&record).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_returns_prior_state() {
        let store = MemoryFaqStore::new();
        let record = store.create(new_faq("Q1", "A1")).await.unwrap();

        let deleted = store.delete(record.id).await.unwrap();

        assert_eq!(deleted, Some(record.clone()));
        assert!(store.find(record.id).await.unwrap().is_none());
        assert!(store.delete(record.id).await.unwrap().is_none());
    }

    // ==================== Row Conversion Tests ====================

    fn row(translations: serde_json::Value) -> FaqRow {
        let now = Utc::now();
        FaqRow {
            id: 5,
            question: "Q".to_string(),
            answer: "A".to_string(),
            translations: Json(translations),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_conversion_reads_translations() {
        let record = row(serde_json::json!({
            "bn": {"question": "প্রশ্ন", "answer": "উত্তর"}
        }))
        .into_record()
        .unwrap();

        assert_eq!(record.translations.get(Language::Bn).unwrap().answer, "উত্তর");
        assert!(record.translations.get(Language::Hi).is_none());
    }

    #[test]
    fn test_row_conversion_rejects_canonical_entry() {
        let err = row(serde_json::json!({
            "en": {"question": "Q", "answer": "A"}
        }))
        .into_record()
        .unwrap_err();

        assert!(matches!(err, StoreError::Corrupt { id: 5, .. }));
    }
}
