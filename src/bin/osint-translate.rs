//! Detect languages and translate event text to English.

use tracing::warn;

use osint_ingestion::translate::{
    HttpTranslator, SUPPORTED_SOURCE_LANGS, TranslationBackend, detect_and_translate,
    detect_language, translate_to_english,
};
use osint_ingestion::{config, logging};

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        return Err(format!("A command is required\n\n{}", help_text()));
    };
    if matches!(command.as_str(), "-h" | "--help") {
        println!("{}", help_text());
        return Ok(());
    }

    match command.as_str() {
        "detect" => {
            let text = args
                .get(1)
                .ok_or_else(|| "detect requires a text argument".to_string())?;
            let language = detect_language(text);
            print_json(&serde_json::json!({ "language": language }))
        }
        "detect_and_translate" => {
            let text = args
                .get(1)
                .ok_or_else(|| "detect_and_translate requires a text argument".to_string())?;
            let backend = connect_backend()?;
            let result = detect_and_translate(&backend, text);
            let json = serde_json::to_string(&result)
                .map_err(|err| format!("Serialize translation failed: {err}"))?;
            println!("{json}");
            Ok(())
        }
        "translate" => {
            let source = args
                .get(1)
                .ok_or_else(|| "translate requires a source language".to_string())?;
            let text = args
                .get(2)
                .ok_or_else(|| "translate requires a text argument".to_string())?;
            let backend = connect_backend()?;
            let (translated_text, success) = translate_to_english(&backend, text, source);
            print_json(&serde_json::json!({
                "translated_text": translated_text,
                "success": success,
            }))
        }
        unknown => Err(format!("Unknown command: {unknown}\n\n{}", help_text())),
    }
}

fn connect_backend() -> Result<HttpTranslator, String> {
    let backend =
        HttpTranslator::new(&config::translate_url()).map_err(|err| err.to_string())?;
    // Missing language pairs degrade to pass-through rather than aborting.
    if let Err(err) = backend.ensure_languages(SUPPORTED_SOURCE_LANGS) {
        warn!("Translation backend check failed: {err}");
    }
    Ok(backend)
}

fn print_json(value: &serde_json::Value) -> Result<(), String> {
    println!("{value}");
    Ok(())
}

fn help_text() -> String {
    [
        "osint-translate",
        "",
        "Detect languages and translate event text to English.",
        "",
        "Usage:",
        "  osint-translate detect <text>",
        "  osint-translate detect_and_translate <text>",
        "  osint-translate translate <source-lang> <text>",
        "",
        "The translation backend URL is read from OSINT_TRANSLATE_URL",
        "(default: http://localhost:5000).",
    ]
    .join("\n")
}
