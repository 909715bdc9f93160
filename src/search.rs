use crate::config::SearchConfig;
use crate::store::{Pagination, SectionRecord};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const BULK_BATCH_SIZE: usize = 500;

/// The indexed projection of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub section_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(rename = "type")]
    pub node_type: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marginal_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
}

impl From<&SectionRecord> for SearchDocument {
    fn from(record: &SectionRecord) -> Self {
        Self {
            section_id: record.section_id.clone(),
            number: record.number.clone(),
            node_type: record.type_name().to_string(),
            text: record.text().to_string(),
            marginal_note: record.marginal_note().map(ToString::to_string),
            part_id: record.part_id.clone(),
        }
    }
}

pub fn search_documents(records: &[SectionRecord]) -> Vec<SearchDocument> {
    records.iter().map(SearchDocument::from).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub section_id: String,
    pub number: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub text: String,
    pub score: f64,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub indexed: usize,
    pub failed: usize,
}

/// A connected full-text index. Constructing one through [`SearchIndex::connect`]
/// guarantees the cluster answered and the index exists.
pub struct SearchIndex {
    client: Client,
    base_url: String,
    index: String,
}

impl SearchIndex {
    pub async fn connect(client: Client, config: &SearchConfig) -> Result<Self, String> {
        let search = Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            index: config.index.clone(),
        };

        let response = search
            .client
            .get(&search.base_url)
            .send()
            .await
            .map_err(|e| format!("Network error contacting search cluster {}: {e}", search.base_url))?;
        if !response.status().is_success() {
            return Err(format!(
                "Search cluster {} answered HTTP {}",
                search.base_url,
                response.status().as_u16()
            ));
        }

        search.ensure_index().await?;
        tracing::info!("[Search] Connected to {} (index {})", search.base_url, search.index);
        Ok(search)
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    fn index_url(&self) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(&self.index))
    }

    async fn ensure_index(&self) -> Result<(), String> {
        let url = self.index_url();
        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| format!("Network error checking index {url}: {e}"))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => self.create_index().await,
            status => Err(format!("HTTP error {} checking index {url}", status.as_u16())),
        }
    }

    async fn create_index(&self) -> Result<(), String> {
        let url = self.index_url();
        let response = self
            .client
            .put(&url)
            .json(&index_definition())
            .send()
            .await
            .map_err(|e| format!("Network error creating index {url}: {e}"))?;
        if !response.status().is_success() {
            return Err(format!(
                "HTTP error {} creating index {url}",
                response.status().as_u16()
            ));
        }
        tracing::info!("[Search] Created index {}", self.index);
        Ok(())
    }

    /// Bulk-indexes `documents` keyed by `section_id`, in batches.
    pub async fn index_documents(&self, documents: &[SearchDocument]) -> Result<IndexSummary, String> {
        let mut summary = IndexSummary::default();

        for batch in documents.chunks(BULK_BATCH_SIZE) {
            let body = bulk_body(&self.index, batch)?;
            let url = format!("{}/_bulk", self.base_url);
            let response = self
                .client
                .post(&url)
                .header("Content-Type", "application/x-ndjson")
                .body(body)
                .send()
                .await
                .map_err(|e| format!("Network error posting bulk request: {e}"))?;
            if !response.status().is_success() {
                return Err(format!(
                    "HTTP error {} posting bulk request",
                    response.status().as_u16()
                ));
            }
            let result: Value = response
                .json()
                .await
                .map_err(|e| format!("Failed to decode bulk response: {e}"))?;

            let failed = bulk_failures(&result);
            if failed > 0 {
                tracing::warn!("[Search] {} documents failed to index in batch", failed);
            }
            summary.failed += failed;
            summary.indexed += batch.len() - failed.min(batch.len());
        }

        tracing::info!(
            "[Search] Indexed {} documents ({} failed)",
            summary.indexed,
            summary.failed
        );
        Ok(summary)
    }

    pub async fn search(&self, query: &str, page: usize, page_size: usize) -> Result<SearchResponse, String> {
        let from = page
            .saturating_sub(1)
            .checked_mul(page_size)
            .ok_or_else(|| format!("Result offset for page {page} of size {page_size} overflows"))?;
        let url = format!("{}/_search", self.index_url());
        let response = self
            .client
            .post(&url)
            .json(&search_body(query, from, page_size))
            .send()
            .await
            .map_err(|e| format!("Network error searching {url}: {e}"))?;
        if !response.status().is_success() {
            return Err(format!(
                "HTTP error {} searching {url}",
                response.status().as_u16()
            ));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| format!("Failed to decode search response: {e}"))?;

        let (results, total) = parse_hits(&body)?;
        Ok(SearchResponse {
            results,
            pagination: Pagination::new(page, page_size, total),
        })
    }
}

fn index_definition() -> Value {
    json!({
        "mappings": {
            "properties": {
                "section_id": { "type": "keyword" },
                "number": { "type": "keyword" },
                "type": { "type": "keyword" },
                "part_id": { "type": "keyword" },
                "text": {
                    "type": "text",
                    "analyzer": "english",
                    "fields": { "keyword": { "type": "keyword", "ignore_above": 8191 } }
                },
                "marginal_note": {
                    "type": "text",
                    "analyzer": "english",
                    "fields": { "keyword": { "type": "keyword" } }
                }
            }
        },
        "settings": {
            "analysis": {
                "analyzer": {
                    "english": {
                        "tokenizer": "standard",
                        "filter": ["lowercase", "english_stop", "english_stemmer"]
                    }
                },
                "filter": {
                    "english_stop": { "type": "stop", "stopwords": "_english_" },
                    "english_stemmer": { "type": "stemmer", "language": "english" }
                }
            }
        }
    })
}

fn bulk_body(index: &str, documents: &[SearchDocument]) -> Result<String, String> {
    let mut body = String::new();
    for document in documents {
        let action = json!({ "index": { "_index": index, "_id": document.section_id } });
        body.push_str(&action.to_string());
        body.push('\n');
        let source = serde_json::to_string(document)
            .map_err(|e| format!("Failed to encode {}: {e}", document.section_id))?;
        body.push_str(&source);
        body.push('\n');
    }
    Ok(body)
}

fn bulk_failures(result: &Value) -> usize {
    if !result["errors"].as_bool().unwrap_or(false) {
        return 0;
    }
    result["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter(|item| item["index"].get("error").is_some())
                .count()
        })
        .unwrap_or(0)
}

fn search_body(query: &str, from: usize, page_size: usize) -> Value {
    json!({
        "query": {
            "multi_match": {
                "query": query,
                "fields": ["text^2", "marginal_note"],
                "fuzziness": "AUTO"
            }
        },
        "highlight": {
            "fields": { "text": {}, "marginal_note": {} }
        },
        "from": from,
        "size": page_size
    })
}

fn parse_hits(body: &Value) -> Result<(Vec<SearchHit>, usize), String> {
    let hits = &body["hits"];
    let Some(entries) = hits["hits"].as_array() else {
        return Err("Search response has no hits".to_string());
    };
    // Older clusters report the total as a bare number.
    let total = hits["total"]["value"]
        .as_u64()
        .or_else(|| hits["total"].as_u64())
        .unwrap_or(entries.len() as u64) as usize;

    let results = entries
        .iter()
        .map(|hit| {
            let source = &hit["_source"];
            let highlights = hit["highlight"]
                .as_object()
                .map(|fields| {
                    fields
                        .values()
                        .filter_map(Value::as_array)
                        .flatten()
                        .filter_map(Value::as_str)
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default();
            SearchHit {
                section_id: source["section_id"].as_str().unwrap_or_default().to_string(),
                number: source["number"].as_str().unwrap_or_default().to_string(),
                node_type: source["type"].as_str().unwrap_or_default().to_string(),
                text: source["text"].as_str().unwrap_or_default().to_string(),
                score: hit["_score"].as_f64().unwrap_or(0.0),
                highlights,
            }
        })
        .collect();

    Ok((results, total))
}
