use crate::error::{FaqError, FaqResult};
use crate::i18n::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A question/answer pair in a single language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub question: String,
    pub answer: String,
}

impl LocalizedText {
    /// Build a pair from user input, trimming both fields.
    ///
    /// Fails with a validation error when either field is blank.
    pub fn new(question: &str, answer: &str) -> FaqResult<Self> {
        let question = question.trim();
        let answer = answer.trim();

        if question.is_empty() || answer.is_empty() {
            return Err(FaqError::Validation(
                "Question and answer are required".to_string(),
            ));
        }

        Ok(Self {
            question: question.to_string(),
            answer: answer.to_string(),
        })
    }

    fn is_complete(&self) -> bool {
        !self.question.trim().is_empty() && !self.answer.trim().is_empty()
    }
}

/// Per-language translations of an FAQ's base content.
///
/// Never holds an entry for the canonical language, and every entry has a
/// non-empty question and answer. A missing entry means "not translated".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<Language, LocalizedText>",
    into = "BTreeMap<Language, LocalizedText>"
)]
pub struct Translations(BTreeMap<Language, LocalizedText>);

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, language: Language) -> Option<&LocalizedText> {
        self.0.get(&language)
    }

    /// Overwrite the entry for one target language.
    pub fn set(&mut self, language: Language, text: LocalizedText) -> FaqResult<()> {
        if language.is_canonical() {
            return Err(FaqError::Validation(format!(
                "'{}' is the base language and cannot hold a translation",
                language
            )));
        }
        if !text.is_complete() {
            return Err(FaqError::Validation(format!(
                "Translation for '{}' must have a question and an answer",
                language
            )));
        }
        self.0.insert(language, text);
        Ok(())
    }

    pub fn contains(&self, language: Language) -> bool {
        self.0.contains_key(&language)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<BTreeMap<Language, LocalizedText>> for Translations {
    type Error = String;

    fn try_from(map: BTreeMap<Language, LocalizedText>) -> Result<Self, Self::Error> {
        let mut translations = Translations::new();
        for (language, text) in map {
            translations
                .set(language, text)
                .map_err(|e| e.to_string())?;
        }
        Ok(translations)
    }
}

impl From<Translations> for BTreeMap<Language, LocalizedText> {
    fn from(translations: Translations) -> Self {
        translations.0
    }
}

/// Content for a record that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewFaq {
    pub base: LocalizedText,
    pub translations: Translations,
}

/// A persisted FAQ entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqRecord {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub translations: Translations,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FaqRecord {
    /// Project this record into the requested language.
    ///
    /// Falls back to the base text when the language has no translation.
    pub fn project(&self, language: Language) -> FaqView {
        let (question, answer) = match self.translations.get(language) {
            Some(text) if !language.is_canonical() => (&text.question, &text.answer),
            _ => (&self.question, &self.answer),
        };

        FaqView {
            id: self.id,
            question: question.clone(),
            answer: answer.clone(),
        }
    }
}

/// One FAQ as seen by a reader of a particular language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqView {
    pub id: i64,
    pub question: String,
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record_with(translations: Translations) -> FaqRecord {
        let now = Utc::now();
        FaqRecord {
            id: 1,
            question: "What is X?".to_string(),
            answer: "X is Y.".to_string(),
            translations,
            created_at: now,
            updated_at: now,
        }
    }

    // ==================== LocalizedText Tests ====================

    #[test]
    fn test_localized_text_trims_input() {
        let text = LocalizedText::new("  What is X?  ", "\tX is Y.\n").unwrap();
        assert_eq!(text.question, "What is X?");
        assert_eq!(text.answer, "X is Y.");
    }

    #[test]
    fn test_localized_text_rejects_blank_fields() {
        assert!(matches!(
            LocalizedText::new("   ", "answer"),
            Err(FaqError::Validation(_))
        ));
        assert!(matches!(
            LocalizedText::new("question", ""),
            Err(FaqError::Validation(_))
        ));
    }

    // ==================== Translations Tests ====================

    #[test]
    fn test_translations_reject_canonical_language() {
        let mut translations = Translations::new();
        let text = LocalizedText::new("q", "a").unwrap();
        assert!(translations.set(Language::En, text).is_err());
        assert!(translations.is_empty());
    }

    #[test]
    fn test_translations_set_overwrites_single_language() {
        let mut translations = Translations::new();
        translations
            .set(Language::Hi, LocalizedText::new("hi q", "hi a").unwrap())
            .unwrap();
        translations
            .set(Language::Bn, LocalizedText::new("bn q", "bn a").unwrap())
            .unwrap();
        translations
            .set(Language::Hi, LocalizedText::new("hi q2", "hi a2").unwrap())
            .unwrap();

        assert_eq!(translations.len(), 2);
        assert_eq!(translations.get(Language::Hi).unwrap().question, "hi q2");
        assert_eq!(translations.get(Language::Bn).unwrap().question, "bn q");
    }

    #[test]
    fn test_translations_json_keyed_by_code() {
        let mut translations = Translations::new();
        translations
            .set(Language::Hi, LocalizedText::new("प्रश्न", "उत्तर").unwrap())
            .unwrap();

        let json = serde_json::to_value(&translations).unwrap();
        assert_eq!(json["hi"]["question"], "प्रश्न");
        assert!(json.get("bn").is_none());
    }

    #[test]
    fn test_translations_deserialize_rejects_canonical_key() {
        let json = r#"{"en": {"question": "q", "answer": "a"}}"#;
        assert!(serde_json::from_str::<Translations>(json).is_err());
    }

    #[test]
    fn test_translations_deserialize_rejects_empty_entry() {
        let json = r#"{"hi": {"question": "", "answer": "a"}}"#;
        assert!(serde_json::from_str::<Translations>(json).is_err());
    }

    #[test]
    fn test_translations_deserialize_rejects_unknown_language() {
        let json = r#"{"fr": {"question": "q", "answer": "a"}}"#;
        assert!(serde_json::from_str::<Translations>(json).is_err());
    }

    // ==================== Projection Tests ====================

    #[test]
    fn test_project_uses_translation_when_present() {
        let mut translations = Translations::new();
        translations
            .set(Language::Hi, LocalizedText::new("X क्या है?", "X, Y है।").unwrap())
            .unwrap();
        let record = record_with(translations);

        let view = record.project(Language::Hi);
        assert_eq!(view.id, 1);
        assert_eq!(view.question, "X क्या है?");
        assert_eq!(view.answer, "X, Y है।");
    }

    #[test]
    fn test_project_falls_back_to_base_text() {
        let record = record_with(Translations::new());

        let view = record.project(Language::Bn);
        assert_eq!(view.question, "What is X?");
        assert_eq!(view.answer, "X is Y.");
    }

    #[test]
    fn test_project_canonical_returns_base() {
        let mut translations = Translations::new();
        translations
            .set(Language::Hi, LocalizedText::new("hq", "ha").unwrap())
            .unwrap();
        let record = record_with(translations);

        assert_eq!(record.project(Language::En).question, "What is X?");
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_value(record_with(Translations::new())).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    // ==================== Property Tests ====================

    fn text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9?.][a-zA-Z0-9 ?.]{0,40}"
    }

    fn translation() -> impl Strategy<Value = Option<(String, String)>> {
        proptest::option::of((text(), text()))
    }

    proptest! {
        #[test]
        fn prop_projection_is_never_empty(
            question in text(),
            answer in text(),
            hi in translation(),
            bn in translation(),
        ) {
            let mut translations = Translations::new();
            for (language, pair) in [(Language::Hi, hi), (Language::Bn, bn)] {
                if let Some((q, a)) = pair {
                    translations.set(language, LocalizedText::new(&q, &a).unwrap()).unwrap();
                }
            }
            let base = LocalizedText::new(&question, &answer).unwrap();
            let now = Utc::now();
            let record = FaqRecord {
                id: 9,
                question: base.question,
                answer: base.answer,
                translations,
                created_at: now,
                updated_at: now,
            };

            for language in Language::ALL {
                let view = record.project(language);
                prop_assert!(!view.question.is_empty());
                prop_assert!(!view.answer.is_empty());
                prop_assert_eq!(view.id, 9);
            }
        }
    }
}
