//! Language detection and translation to English.
//!
//! Detection runs locally; translation goes through a LibreTranslate-style
//! HTTP backend behind the [`TranslationBackend`] trait. English input is
//! returned unchanged, and a failed translation falls back to the original
//! text rather than erroring the invocation.

mod client;
mod detect;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

pub use client::HttpTranslator;
pub use detect::{SUPPORTED_SOURCE_LANGS, detect_language};

/// Errors surfaced by a translation backend.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The backend could not be reached or returned a malformed response.
    #[error("Translation request failed: {0}")]
    Http(String),
    /// The backend answered but could not translate the text.
    #[error("Translation backend error: {0}")]
    Backend(String),
    /// A required language pair is not installed on the backend.
    #[error("No translation package for {0} -> en")]
    MissingLanguage(String),
}

/// Seam over the translation engine so callers can be tested offline.
pub trait TranslationBackend {
    /// Verify the backend can translate each source language to English.
    fn ensure_languages(&self, sources: &[&str]) -> Result<(), TranslateError>;
    /// Translate text from `source` into English.
    fn translate(&self, text: &str, source: &str) -> Result<String, TranslateError>;
}

/// Detection-plus-translation response as printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct Translation {
    pub original_text: String,
    pub translated_text: String,
    pub original_language: String,
    pub translated: bool,
}

/// Detect the language of `text` and translate it to English when needed.
pub fn detect_and_translate(backend: &dyn TranslationBackend, text: &str) -> Translation {
    let original_language = detect_language(text);
    let (translated_text, translated) = translate_to_english(backend, text, &original_language);
    Translation {
        original_text: text.to_string(),
        translated_text,
        original_language,
        translated,
    }
}

/// Translate `text` from `source` into English. English passes through
/// untouched; backend failures are logged and fall back to the original
/// text with `translated = false`.
pub fn translate_to_english(
    backend: &dyn TranslationBackend,
    text: &str,
    source: &str,
) -> (String, bool) {
    if source == "en" {
        return (text.to_string(), false);
    }
    match backend.translate(text, source) {
        Ok(translated) => (translated, true),
        Err(err) => {
            warn!("Translation error: {err}");
            (text.to_string(), false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct StubBackend {
        response: Result<String, ()>,
        calls: RefCell<Vec<(String, String)>>,
    }

    impl StubBackend {
        fn translating_to(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl TranslationBackend for StubBackend {
        fn ensure_languages(&self, _sources: &[&str]) -> Result<(), TranslateError> {
            Ok(())
        }

        fn translate(&self, text: &str, source: &str) -> Result<String, TranslateError> {
            self.calls
                .borrow_mut()
                .push((text.to_string(), source.to_string()));
            match &self.response {
                Ok(translated) => Ok(translated.clone()),
                Err(()) => Err(TranslateError::Backend("engine unavailable".to_string())),
            }
        }
    }

    #[test]
    fn english_input_passes_through_without_backend_call() {
        let backend = StubBackend::translating_to("should not be used");
        let text = "The quick brown fox jumps over the lazy dog near the river bank.";
        let result = detect_and_translate(&backend, text);
        assert_eq!(result.original_language, "en");
        assert_eq!(result.translated_text, text);
        assert!(!result.translated);
        assert!(backend.calls.borrow().is_empty());
    }

    #[test]
    fn non_english_input_is_translated() {
        let backend = StubBackend::translating_to("The government announced new measures.");
        let text = "El gobierno anunció nuevas medidas económicas durante la conferencia de prensa.";
        let result = detect_and_translate(&backend, text);
        assert_eq!(result.original_language, "es");
        assert!(result.translated);
        assert_eq!(
            result.translated_text,
            "The government announced new measures."
        );
        assert_eq!(result.original_text, text);
        assert_eq!(backend.calls.borrow().len(), 1);
    }

    #[test]
    fn backend_failure_returns_original_text() {
        let backend = StubBackend::failing();
        let (text, translated) = translate_to_english(&backend, "bonjour tout le monde", "fr");
        assert_eq!(text, "bonjour tout le monde");
        assert!(!translated);
    }
}
