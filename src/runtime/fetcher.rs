use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_SOURCE_URL: &str = "https://laws-lois.justice.gc.ca/eng/acts/c-46/FullText.html";

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, String>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Network error fetching {url}: {e}"))?;

        if !response.status().is_success() {
            return Err(format!(
                "HTTP error {} fetching {url}",
                response.status().as_u16()
            ));
        }

        response
            .text()
            .await
            .map_err(|e| format!("Error reading response body from {url}: {e}"))
    }
}

/// Provenance of one downloaded statute page.
#[derive(Debug, Clone, Serialize)]
pub struct FetchRecord {
    pub url: String,
    pub path: PathBuf,
    pub bytes: usize,
    pub accessed_at: String,
}

/// Downloads `url` and writes the body to `path`, creating parent
/// directories as needed.
pub async fn fetch_to_file(
    fetcher: &dyn Fetcher,
    url: &str,
    path: &Path,
) -> Result<FetchRecord, String> {
    let body = fetcher.fetch(url).await?;
    let accessed_at = chrono::Utc::now().to_rfc3339();

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
    }
    tokio::fs::write(path, body.as_bytes())
        .await
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;

    tracing::info!(
        "[Fetch] Saved {} bytes from {} to {}",
        body.len(),
        url,
        path.display()
    );

    Ok(FetchRecord {
        url: url.to_string(),
        path: path.to_path_buf(),
        bytes: body.len(),
        accessed_at,
    })
}
