use statute_ingest::config::AppConfig;
use statute_ingest::runtime::fetcher::{fetch_to_file, HttpFetcher};
use statute_ingest::runtime::logging::init_tracing;
use std::path::PathBuf;

type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), DynError> {
    init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.len() > 2 {
        eprintln!("Usage: fetch_statute [url] [output.html]");
        std::process::exit(2);
    }

    let config = AppConfig::from_env()?;
    let url = args.first().cloned().unwrap_or(config.source_url);
    let output = args.get(1).map(PathBuf::from).unwrap_or(config.html_path);

    let fetcher = HttpFetcher::new(reqwest::Client::new());
    let record = fetch_to_file(&fetcher, &url, &output).await?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
