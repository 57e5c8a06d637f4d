//! Language type: the closed set of languages FAQ content is served in.

use crate::error::FaqError;
use crate::i18n::{LanguageConfig, LanguageRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported language.
///
/// Serialises as its ISO 639-1 code, which is also how it appears as a key
/// in a stored translation map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
    Bn,
}

impl Language {
    /// Every supported language, canonical first.
    pub const ALL: [Language; 3] = [Language::En, Language::Hi, Language::Bn];

    /// Parse a language code, rejecting anything outside the supported set.
    pub fn from_code(code: &str) -> Result<Language, FaqError> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == code)
            .ok_or_else(|| FaqError::UnsupportedLanguage(code.to_string()))
    }

    /// The language FAQ content is authored in.
    pub fn canonical() -> Language {
        Language::En
    }

    /// Every language that base content is translated into.
    pub fn targets() -> impl Iterator<Item = Language> {
        Language::ALL.into_iter().filter(|lang| !lang.is_canonical())
    }

    /// ISO 639-1 code (e.g., "en", "hi").
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Bn => "bn",
        }
    }

    /// Registry metadata for this language.
    pub fn config(&self) -> &'static LanguageConfig {
        // Registry rows follow variant declaration order.
        &LanguageRegistry::get().list_all()[*self as usize]
    }

    /// English name of the language.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn is_canonical(&self) -> bool {
        *self == Language::canonical()
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::canonical()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = FaqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s)
    }
}
