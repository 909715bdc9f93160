use crate::types::{LegislativeNode, Part, StatuteDocument};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A stored section: the parsed node plus the part it falls under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionRecord {
    #[serde(skip)]
    pub section_id: String,
    #[serde(skip)]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
    #[serde(flatten)]
    pub node: LegislativeNode,
}

impl SectionRecord {
    pub fn type_name(&self) -> &'static str {
        self.node.type_name()
    }

    pub fn text(&self) -> &str {
        self.node.head().map(|head| head.text.as_str()).unwrap_or_default()
    }

    pub fn marginal_note(&self) -> Option<&str> {
        self.node.head().and_then(|head| head.marginal_note.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportBatch {
    pub sections: Vec<SectionRecord>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub sections_imported: usize,
    pub parts_imported: usize,
}

/// Splits a parsed document into part and section records. Each section is
/// stamped with the identifier of the last part heading before it.
pub fn records_from_document(document: &StatuteDocument) -> ImportBatch {
    let mut batch = ImportBatch::default();
    let mut current_part: Option<String> = None;

    for node in &document.sections {
        if let Some(part) = node.as_part() {
            current_part = Some(part.part_id.clone());
            batch.parts.push(part.clone());
            continue;
        }
        let Some(head) = node.head() else {
            continue;
        };
        batch.sections.push(SectionRecord {
            section_id: head.section_id.clone(),
            number: head.number.clone(),
            part_id: current_part.clone(),
            node: node.clone(),
        });
    }

    batch
}

#[async_trait]
pub trait SectionRepository: Send + Sync {
    async fn insert_sections(&self, records: Vec<SectionRecord>) -> Result<usize, String>;
    async fn insert_parts(&self, parts: Vec<Part>) -> Result<usize, String>;
    async fn section_by_id(&self, section_id: &str) -> Result<Option<SectionRecord>, String>;
    async fn section_by_number(&self, number: &str) -> Result<Option<SectionRecord>, String>;
    async fn list_sections(&self, skip: usize, limit: usize) -> Result<Vec<SectionRecord>, String>;
    async fn count_sections(&self) -> Result<usize, String>;
    async fn list_parts(&self) -> Result<Vec<Part>, String>;
    async fn part_by_id(&self, part_id: &str) -> Result<Option<Part>, String>;
    async fn sections_in_part(&self, part_id: &str) -> Result<Vec<SectionRecord>, String>;
}

pub async fn import_document(
    repository: &dyn SectionRepository,
    document: &StatuteDocument,
) -> Result<ImportSummary, String> {
    let batch = records_from_document(document);
    let sections_imported = repository.insert_sections(batch.sections).await?;
    let parts_imported = repository.insert_parts(batch.parts).await?;
    tracing::info!(
        "[Store] Imported {} sections and {} parts",
        sections_imported,
        parts_imported
    );
    Ok(ImportSummary {
        sections_imported,
        parts_imported,
    })
}

#[derive(Default)]
struct Collections {
    sections: Vec<SectionRecord>,
    by_id: HashMap<String, usize>,
    by_number: HashMap<String, usize>,
    parts: Vec<Part>,
    parts_by_id: HashMap<String, usize>,
}

/// Keeps every record in memory, in insertion order. Re-inserting an
/// identifier replaces the stored record in place.
#[derive(Default)]
pub struct InMemoryRepository {
    collections: RwLock<Collections>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SectionRepository for InMemoryRepository {
    async fn insert_sections(&self, records: Vec<SectionRecord>) -> Result<usize, String> {
        let mut guard = self.collections.write().await;
        let collections = &mut *guard;
        let inserted = records.len();
        for record in records {
            let existing = collections.by_id.get(&record.section_id).copied();
            if let Some(number) = &record.number {
                let position = existing.unwrap_or(collections.sections.len());
                collections.by_number.insert(number.clone(), position);
            }
            match existing {
                Some(position) => {
                    if let Some(old_number) = &collections.sections[position].number {
                        if record.number.as_ref() != Some(old_number) {
                            collections.by_number.remove(old_number);
                        }
                    }
                    collections.sections[position] = record;
                }
                None => {
                    collections
                        .by_id
                        .insert(record.section_id.clone(), collections.sections.len());
                    collections.sections.push(record);
                }
            }
        }
        Ok(inserted)
    }

    async fn insert_parts(&self, parts: Vec<Part>) -> Result<usize, String> {
        let mut guard = self.collections.write().await;
        let collections = &mut *guard;
        let inserted = parts.len();
        for part in parts {
            match collections.parts_by_id.get(&part.part_id).copied() {
                Some(position) => collections.parts[position] = part,
                None => {
                    let position = collections.parts.len();
                    collections.parts_by_id.insert(part.part_id.clone(), position);
                    collections.parts.push(part);
                }
            }
        }
        Ok(inserted)
    }

    async fn section_by_id(&self, section_id: &str) -> Result<Option<SectionRecord>, String> {
        let collections = self.collections.read().await;
        Ok(collections
            .by_id
            .get(section_id)
            .map(|&position| collections.sections[position].clone()))
    }

    async fn section_by_number(&self, number: &str) -> Result<Option<SectionRecord>, String> {
        let collections = self.collections.read().await;
        Ok(collections
            .by_number
            .get(number)
            .map(|&position| collections.sections[position].clone()))
    }

    async fn list_sections(&self, skip: usize, limit: usize) -> Result<Vec<SectionRecord>, String> {
        let collections = self.collections.read().await;
        Ok(collections
            .sections
            .iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_sections(&self) -> Result<usize, String> {
        Ok(self.collections.read().await.sections.len())
    }

    async fn list_parts(&self) -> Result<Vec<Part>, String> {
        Ok(self.collections.read().await.parts.clone())
    }

    async fn part_by_id(&self, part_id: &str) -> Result<Option<Part>, String> {
        let collections = self.collections.read().await;
        Ok(collections
            .parts_by_id
            .get(part_id)
            .map(|&position| collections.parts[position].clone()))
    }

    async fn sections_in_part(&self, part_id: &str) -> Result<Vec<SectionRecord>, String> {
        let collections = self.collections.read().await;
        Ok(collections
            .sections
            .iter()
            .filter(|record| record.part_id.as_deref() == Some(part_id))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub title: String,
    #[serde(rename = "type")]
    pub entry_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocPart {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subheading: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub sections: Vec<TocEntry>,
}

/// Parts in order, each listing the sections stamped with its identifier.
pub async fn build_table_of_contents(
    repository: &dyn SectionRepository,
) -> Result<Vec<TocPart>, String> {
    let parts = repository.list_parts().await?;
    let mut toc = Vec::with_capacity(parts.len());

    for part in parts {
        let sections = repository
            .sections_in_part(&part.part_id)
            .await?
            .into_iter()
            .map(|record| TocEntry {
                title: record
                    .marginal_note()
                    .unwrap_or_else(|| record.text())
                    .to_string(),
                entry_type: record.type_name().to_string(),
                id: record.section_id,
                number: record.number,
            })
            .collect();

        toc.push(TocPart {
            id: part.part_id,
            title: part.text,
            subheading: part.subheading,
            entry_type: "Part".to_string(),
            sections,
        });
    }

    Ok(toc)
}

/// Pagination metadata shared by list and search responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl Pagination {
    pub fn new(page: usize, page_size: usize, total_items: usize) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_items.div_ceil(page_size)
        };
        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}
