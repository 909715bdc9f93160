#![allow(dead_code)]
use statute_ingest::parser::{parse_statute_html, ParseOutcome};
use statute_ingest::store::{import_document, InMemoryRepository};
use statute_ingest::types::{LegislativeNode, ListItem, StatuteDocument};
use std::path::Path;
use std::sync::Arc;

pub const EXCERPT_FIXTURE: &str = "criminal_code_excerpt.html";

pub fn fixtures_dir() -> String {
    format!("{}/tests/fixtures", env!("CARGO_MANIFEST_DIR"))
}

pub fn load_fixture(filename: &str) -> String {
    let path = Path::new(&fixtures_dir()).join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

pub fn parse_fixture(filename: &str) -> ParseOutcome {
    parse_statute_html(&load_fixture(filename)).expect("fixture should parse")
}

pub fn excerpt() -> StatuteDocument {
    parse_fixture(EXCERPT_FIXTURE).document
}

pub async fn excerpt_repository() -> Arc<InMemoryRepository> {
    let repository = Arc::new(InMemoryRepository::new());
    import_document(repository.as_ref(), &excerpt())
        .await
        .expect("import should succeed");
    repository
}

pub fn find_section<'a>(document: &'a StatuteDocument, section_id: &str) -> &'a LegislativeNode {
    document
        .sections
        .iter()
        .find(|node| node.head().is_some_and(|head| head.section_id == section_id))
        .unwrap_or_else(|| {
            let available: Vec<_> = document
                .sections
                .iter()
                .filter_map(|node| node.head().map(|head| head.section_id.clone()))
                .collect();
            panic!(
                "Section '{}' not found. Available sections: {:?}",
                section_id, available
            )
        })
}

/// Renders extracted list items back into provision-list markup.
pub fn render_provision_list(items: &[ListItem]) -> String {
    let mut html = String::from(r#"<ul class="ProvisionList">"#);
    for item in items {
        html.push_str(r#"<li><p class="Paragraph">"#);
        if let Some(label) = &item.label {
            html.push_str(&format!(r#"<span class="lawlabel">{label}</span> "#));
        }
        html.push_str(&item.text);
        html.push_str("</p>");
        if !item.sub_items.is_empty() {
            html.push_str(&render_provision_list(&item.sub_items));
        }
        if let Some(continued) = &item.continued_text {
            html.push_str(&format!(r#"<p class="ContinuedParagraph">{continued}</p>"#));
        }
        html.push_str("</li>");
    }
    html.push_str("</ul>");
    html
}
