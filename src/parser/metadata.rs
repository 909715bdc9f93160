use crate::parser::dom::StatuteDom;
use crate::parser::text::{decode_entities, normalize_text};
use std::collections::BTreeMap;

const METADATA_PREFIX: &str = "dcterms.";

/// Document-level `meta name="dcterms.*"` values keyed by the stripped
/// name (`title`, `creator`, `issued`, ...). A repeated key keeps the last value.
pub fn extract_metadata(dom: &StatuteDom) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    for element in dom.elements().iter().copied() {
        if !dom.is_tag(element, "meta") {
            continue;
        }
        let Some(name) = dom.attr(element, "name") else {
            continue;
        };
        let Some(key) = name.trim().strip_prefix(METADATA_PREFIX) else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        let content = dom.attr(element, "content").unwrap_or_default();
        metadata.insert(key.to_string(), normalize_text(&decode_entities(&content)));
    }

    metadata
}
