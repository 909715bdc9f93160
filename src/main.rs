use statute_ingest::api::{router, AppState};
use statute_ingest::config::AppConfig;
use statute_ingest::ingest::load_document;
use statute_ingest::runtime::logging::{init_tracing, log_event, LogLevel};
use statute_ingest::search::SearchIndex;
use statute_ingest::store::{import_document, InMemoryRepository, SectionRepository};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let repository = Arc::new(InMemoryRepository::new());
    match load_document(&config.json_path) {
        Ok(document) => {
            import_document(repository.as_ref(), &document)
                .await
                .expect("Failed to import parsed statute");
        }
        Err(err) => log_event(
            LogLevel::Warn,
            "Parsed statute not loaded; serving an empty repository",
            Some(json!({ "path": config.json_path.display().to_string(), "error": err })),
        ),
    }

    let search = match &config.search {
        Some(search_config) => {
            match SearchIndex::connect(reqwest::Client::new(), search_config).await {
                Ok(index) => Some(Arc::new(index)),
                Err(err) => {
                    tracing::error!("[Api] Search disabled: {}", err);
                    None
                }
            }
        }
        None => None,
    };

    let repository: Arc<dyn SectionRepository> = repository;
    let app = router(AppState { repository, search });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {e}", config.bind_addr));

    tracing::info!("[Api] Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("[Api] Failed to listen for shutdown signal: {}", err);
        return;
    }
    tracing::info!("[Api] Shutting down");
}
