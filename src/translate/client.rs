use std::sync::OnceLock;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::{TranslateError, TranslationBackend};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(30);
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP agent with consistent timeouts.
fn agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .timeout_write(WRITE_TIMEOUT)
            .build()
    })
}

#[derive(Debug, Clone, Deserialize)]
struct LanguageEntry {
    code: String,
    #[serde(default)]
    targets: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// LibreTranslate-compatible HTTP backend.
pub struct HttpTranslator {
    base_url: Url,
}

impl HttpTranslator {
    /// Build a client for the given base URL, e.g. `http://localhost:5000`.
    pub fn new(base_url: &str) -> Result<Self, TranslateError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| TranslateError::Http(format!("Invalid backend URL {base_url}: {err}")))?;
        Ok(Self { base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, TranslateError> {
        self.base_url
            .join(path)
            .map_err(|err| TranslateError::Http(format!("Invalid endpoint {path}: {err}")))
    }
}

impl TranslationBackend for HttpTranslator {
    fn ensure_languages(&self, sources: &[&str]) -> Result<(), TranslateError> {
        let url = self.endpoint("languages")?;
        let languages: Vec<LanguageEntry> = agent()
            .get(url.as_str())
            .call()
            .map_err(|err| TranslateError::Http(err.to_string()))?
            .into_json()
            .map_err(|err| TranslateError::Http(err.to_string()))?;
        for source in sources {
            let supported = languages.iter().any(|entry| {
                entry.code == *source
                    && (entry.targets.is_empty() || entry.targets.iter().any(|t| t == "en"))
            });
            if !supported {
                return Err(TranslateError::MissingLanguage(source.to_string()));
            }
        }
        Ok(())
    }

    fn translate(&self, text: &str, source: &str) -> Result<String, TranslateError> {
        let url = self.endpoint("translate")?;
        let response = agent()
            .post(url.as_str())
            .send_json(serde_json::json!({
                "q": text,
                "source": source,
                "target": "en",
                "format": "text",
            }))
            .map_err(|err| TranslateError::Http(err.to_string()))?;
        let parsed: TranslateResponse = response
            .into_json()
            .map_err(|err| TranslateError::Backend(format!("Malformed response: {err}")))?;
        Ok(parsed.translated_text)
    }
}
