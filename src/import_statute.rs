use statute_ingest::config::AppConfig;
use statute_ingest::ingest::load_document;
use statute_ingest::runtime::logging::init_tracing;
use statute_ingest::search::{search_documents, SearchIndex};
use statute_ingest::store::{import_document, InMemoryRepository, SectionRepository};
use std::path::PathBuf;

type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), DynError> {
    init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.len() > 1 {
        eprintln!("Usage: import_statute [parsed.json]");
        std::process::exit(2);
    }

    let config = AppConfig::from_env()?;
    let input = args.first().map(PathBuf::from).unwrap_or(config.json_path);
    let Some(search_config) = config.search else {
        eprintln!("ELASTICSEARCH_URL is not set; nothing to import into");
        std::process::exit(2);
    };

    let document = load_document(&input)?;
    let repository = InMemoryRepository::new();
    let imported = import_document(&repository, &document).await?;
    println!(
        "Loaded {} sections and {} parts from {}",
        imported.sections_imported,
        imported.parts_imported,
        input.display()
    );

    let total = repository.count_sections().await?;
    let records = repository.list_sections(0, total).await?;
    let documents = search_documents(&records);

    let index = SearchIndex::connect(reqwest::Client::new(), &search_config).await?;
    let summary = index.index_documents(&documents).await?;
    println!(
        "Indexed {} documents into {} ({} failed)",
        summary.indexed,
        index.index_name(),
        summary.failed
    );

    Ok(())
}
