//! Internationalization (i18n) module.
//!
//! FAQ content is authored in one canonical language and translated into a
//! fixed set of target languages. Both the set and its metadata live here.
//!
//! - `language`: the closed `Language` enumeration
//! - `registry`: names and flags for each supported language
//!
//! # Example
//!
//! ```rust,ignore
//! use faq_service::i18n::Language;
//!
//! let hindi = Language::from_code("hi")?;
//! assert!(!hindi.is_canonical());
//!
//! for target in Language::targets() {
//!     println!("translating into {}", target.name());
//! }
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
