use std::{env, fs, path::Path, process::ExitCode, time::Instant};

use feature_scorer::{Classification, EngineConfig, ParsedDocument, ScoringEngine};
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct Output<'a> {
    id: &'a str,
    #[serde(flatten)]
    classification: Classification,
}

fn print_usage() {
    eprintln!("Usage: feature-scorer <config.toml> <document.json>...");
    eprintln!("Each document is printed as one JSON line: {{\"id\":..,\"scores\":[..]}}");
}

fn read_document(path: &Path) -> Result<ParsedDocument, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let mut document: ParsedDocument = serde_json::from_str(&text)?;
    if document.id.is_empty() {
        document.id = path.display().to_string();
    }
    Ok(document)
}

fn run(config_path: &str, documents: &[String]) -> Result<usize, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let config = EngineConfig::load(config_path)?;
    let engine = ScoringEngine::from_config(config)?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "engine built");

    let mut failed = 0usize;
    for path in documents {
        let document = match read_document(Path::new(path)) {
            Ok(document) => document,
            Err(err) => {
                error!(path = %path, "failed to read document: {err}");
                failed += 1;
                continue;
            }
        };
        match engine.classify(&document) {
            Ok(classification) => {
                let output = Output {
                    id: &document.id,
                    classification,
                };
                println!("{}", serde_json::to_string(&output)?);
            }
            Err(err) => {
                warn!(document = %document.id, "document not scored: {err}");
                failed += 1;
            }
        }
    }
    let stats = engine.cache_stats();
    info!(
        documents = documents.len(),
        failed,
        cache_hit_rate = stats.hit_rate(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "done"
    );
    Ok(failed)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") || args.len() < 2 {
        print_usage();
        return ExitCode::from(2);
    }
    match run(&args[0], &args[1..]) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
