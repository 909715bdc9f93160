use crate::runtime::fetcher::DEFAULT_SOURCE_URL;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_INDEX: &str = "criminal_code";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub url: String,
    #[serde(default = "default_index")]
    pub index: String,
}

fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source_url: String,
    pub html_path: PathBuf,
    pub json_path: PathBuf,
    pub bind_addr: String,
    pub search: Option<SearchConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            html_path: PathBuf::from("data/criminal_code.html"),
            json_path: PathBuf::from("data/criminal_code.json"),
            bind_addr: "0.0.0.0:8000".to_string(),
            search: None,
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// File named by `STATUTE_CONFIG` (or the defaults), then environment overrides.
    pub fn from_env() -> Result<Self, String> {
        let base = match env::var("STATUTE_CONFIG") {
            Ok(path) => Self::load_from_file(path)?,
            Err(_) => Self::default(),
        };
        Ok(base.with_overrides(|key| env::var(key).ok()))
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = lookup("STATUTE_SOURCE_URL") {
            self.source_url = url;
        }
        if let Some(path) = lookup("STATUTE_HTML_PATH") {
            self.html_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("STATUTE_JSON_PATH") {
            self.json_path = PathBuf::from(path);
        }
        if let Some(addr) = lookup("STATUTE_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(url) = lookup("ELASTICSEARCH_URL") {
            let index = self
                .search
                .take()
                .map(|search| search.index)
                .unwrap_or_else(default_index);
            self.search = Some(SearchConfig { url, index });
        }
        if let (Some(index), Some(search)) = (lookup("ELASTICSEARCH_INDEX"), self.search.as_mut()) {
            search.index = index;
        }

        if self.search.is_none() {
            tracing::info!("[Config] Search index not configured; search is disabled");
        }
        self
    }
}
