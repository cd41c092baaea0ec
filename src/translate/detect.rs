use whatlang::{Detector, Lang};

/// Source languages the translation backend is expected to cover.
pub const SUPPORTED_SOURCE_LANGS: &[&str] =
    &["es", "fr", "de", "ru", "ar", "zh", "ja", "ko", "pt", "it"];

/// Candidate set for detection: English plus the supported source
/// languages. Scoring against whatlang's full language set misattributes
/// short English prose to unrelated languages.
const DETECTABLE_LANGS: &[Lang] = &[
    Lang::Eng,
    Lang::Spa,
    Lang::Fra,
    Lang::Deu,
    Lang::Rus,
    Lang::Ara,
    Lang::Cmn,
    Lang::Jpn,
    Lang::Kor,
    Lang::Por,
    Lang::Ita,
];

/// Detect the language of the text, mapped to the canonical two-letter set.
/// Detection failure defaults to English.
pub fn detect_language(text: &str) -> String {
    let detector = Detector::with_allowlist(DETECTABLE_LANGS.to_vec());
    match detector.detect_lang(text) {
        Some(lang) => canonical_code(lang),
        None => "en".to_string(),
    }
}

/// Map whatlang's ISO 639-3 identifiers onto the two-letter codes the
/// translation backend understands; other languages keep their detector
/// code.
fn canonical_code(lang: Lang) -> String {
    let code = match lang {
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Rus => "ru",
        Lang::Ara => "ar",
        Lang::Cmn => "zh",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Por => "pt",
        Lang::Ita => "it",
        other => other.code(),
    };
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_english_text() {
        let text = "The quick brown fox jumps over the lazy dog near the river bank.";
        assert_eq!(detect_language(text), "en");
    }

    #[test]
    fn detects_spanish_text() {
        let text = "El gobierno anunció nuevas medidas económicas durante la conferencia de prensa de ayer.";
        assert_eq!(detect_language(text), "es");
    }

    #[test]
    fn detects_russian_text() {
        let text = "Российские войска продолжают наступление в восточном направлении, сообщают местные источники.";
        assert_eq!(detect_language(text), "ru");
    }

    #[test]
    fn empty_text_defaults_to_english() {
        assert_eq!(detect_language(""), "en");
    }

    #[test]
    fn mandarin_maps_to_zh() {
        assert_eq!(canonical_code(Lang::Cmn), "zh");
    }

    #[test]
    fn allowlist_covers_english_and_every_supported_source() {
        let codes: Vec<String> = DETECTABLE_LANGS
            .iter()
            .map(|lang| canonical_code(*lang))
            .collect();
        assert_eq!(codes.len(), SUPPORTED_SOURCE_LANGS.len() + 1);
        assert!(codes.iter().any(|code| code == "en"));
        for source in SUPPORTED_SOURCE_LANGS {
            assert!(codes.iter().any(|code| code == source), "missing {source}");
        }
    }
}
