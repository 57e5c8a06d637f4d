//! Language registry: static metadata for every supported language.
//!
//! The set of languages is closed (see [`Language`](super::Language)); this
//! table only carries the descriptive data attached to each code.

/// Metadata for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "hi", "bn")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Hindi")
    pub name: &'static str,

    /// Name of the language in its own script (e.g., "हिन्दी", "বাংলা")
    pub native_name: &'static str,

    /// Whether FAQ content is authored in this language (exactly one is true)
    pub is_canonical: bool,
}

/// Registry of supported languages, in declaration order.
pub struct LanguageRegistry {
    languages: &'static [LanguageConfig],
}

static LANGUAGES: [LanguageConfig; 3] = [
    LanguageConfig {
        code: "en",
        name: "English",
        native_name: "English",
        is_canonical: true,
    },
    LanguageConfig {
        code: "hi",
        name: "Hindi",
        native_name: "हिन्दी",
        is_canonical: false,
    },
    LanguageConfig {
        code: "bn",
        name: "Bengali",
        native_name: "বাংলা",
        is_canonical: false,
    },
];

static REGISTRY: LanguageRegistry = LanguageRegistry {
    languages: &LANGUAGES,
};

impl LanguageRegistry {
    /// Get the global language registry.
    pub fn get() -> &'static LanguageRegistry {
        &REGISTRY
    }

    /// All supported languages, canonical first.
    pub fn list_all(&self) -> &'static [LanguageConfig] {
        self.languages
    }

    /// Accepted codes with native names, e.g. "en (English), hi (हिन्दी)".
    pub fn describe_supported(&self) -> String {
        self.languages
            .iter()
            .map(|lang| format!("{} ({})", lang.code, lang.native_name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
