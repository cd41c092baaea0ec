//! Embed one text read from stdin and print the vector as JSON.

use std::io::Read;

use serde::Deserialize;

use osint_ingestion::embedding;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Deserialize)]
struct EmbedRequest {
    #[serde(default)]
    text: String,
    #[serde(default)]
    language: Option<String>,
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("-h" | "--help") => {
            println!("{}", help_text());
            return Ok(());
        }
        // Health probe used by callers to check the binary is runnable.
        Some("--test") => {
            println!("{}", serde_json::json!({ "test": "success" }));
            return Ok(());
        }
        Some(unknown) => {
            return Err(format!("Unknown argument: {unknown}\n\n{}", help_text()));
        }
        None => {}
    }

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|err| format!("Read stdin failed: {err}"))?;
    let request: EmbedRequest = serde_json::from_str(&input)
        .map_err(|err| format!("Parse embed request failed: {err}"))?;
    let result = embedding::embed_text(&request.text, request.language.as_deref());
    let json = serde_json::to_string(&result)
        .map_err(|err| format!("Serialize embedding failed: {err}"))?;
    println!("{json}");
    Ok(())
}

fn help_text() -> String {
    [
        "osint-embed",
        "",
        "Embed text with the multilingual sentence model.",
        "",
        "Usage:",
        "  echo '{\"text\": \"...\", \"language\": \"es\"}' | osint-embed",
        "  osint-embed --test",
        "",
        "Options:",
        "  --test   Print a readiness probe response and exit.",
    ]
    .join("\n")
}
