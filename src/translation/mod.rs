//! Text translation through an OpenAI-compatible chat completions endpoint.

mod client;
mod language;
mod prompt;
mod sse_parser;

pub use client::{TranslationClient, TranslationRequest};
pub use language::{SUPPORTED_LANGUAGES, language_name, validate_language};

use std::future::Future;

use crate::error::Result;

/// Default language of the practice corpus.
pub const DEFAULT_SOURCE_LANGUAGE: &str = "de";

/// Default language translations are produced in.
pub const DEFAULT_TARGET_LANGUAGE: &str = "en";

/// Translates text between two languages given as ISO 639-1 codes.
pub trait Translator: Send + Sync + 'static {
    fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Source and target language used by the translate command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE_LANGUAGE.to_string(),
            target: DEFAULT_TARGET_LANGUAGE.to_string(),
        }
    }
}
