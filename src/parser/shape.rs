use crate::types::StatuteDocument;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// A reference JSON output used as a soft guide for the shape of a parse.
/// Nothing here rejects output; it only produces warnings.
#[derive(Debug, Clone, Default)]
pub struct ShapeGuide {
    top_level_keys: BTreeSet<String>,
    known_types: BTreeSet<String>,
}

impl ShapeGuide {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read reference {}: {e}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse reference {}: {e}", path.display()))?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Self {
        let mut guide = Self::default();
        if let Some(object) = value.as_object() {
            guide.top_level_keys = object.keys().cloned().collect();
        }
        if let Some(sections) = value.get("sections") {
            collect_types(sections, &mut guide.known_types);
        }
        guide
    }

    pub fn known_types(&self) -> &BTreeSet<String> {
        &self.known_types
    }

    pub fn check(&self, document: &StatuteDocument) -> Vec<String> {
        let mut warnings = Vec::new();

        if !self.top_level_keys.is_empty() {
            for key in ["metadata", "sections"] {
                if !self.top_level_keys.contains(key) {
                    warnings.push(format!("reference has no top-level \"{key}\" field"));
                }
            }
        }

        if self.known_types.is_empty() {
            return warnings;
        }
        let used: BTreeSet<&str> = document.sections.iter().map(|node| node.type_name()).collect();
        for tag in used {
            if !self.known_types.contains(tag) {
                warnings.push(format!("type {tag} does not appear in the reference"));
            }
        }
        warnings
    }
}

fn collect_types(value: &Value, types: &mut BTreeSet<String>) {
    match value {
        Value::Array(values) => {
            for value in values {
                collect_types(value, types);
            }
        }
        Value::Object(object) => {
            if let Some(Value::String(tag)) = object.get("type") {
                types.insert(tag.clone());
            }
            for value in object.values() {
                collect_types(value, types);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LegislativeNode, SectionHead};
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn reports_tags_missing_from_reference() {
        let guide = ShapeGuide::from_value(&json!({
            "metadata": {},
            "sections": [{ "type": "Part" }, { "type": "SectionWithList", "items": [] }]
        }));
        let document = StatuteDocument {
            metadata: BTreeMap::new(),
            sections: vec![LegislativeNode::Section(SectionHead {
                section_id: "s1".to_string(),
                number: Some("1".to_string()),
                marginal_note: None,
                text: "Short title".to_string(),
                historical_note: None,
            })],
        };

        assert_eq!(
            guide.check(&document),
            vec!["type Section does not appear in the reference".to_string()]
        );
    }
}
