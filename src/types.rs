use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One parsed statute: document-level metadata plus every part and section
/// in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatuteDocument {
    pub metadata: BTreeMap<String, String>,
    pub sections: Vec<LegislativeNode>,
}

/// A classified top-level unit. Each section tag carries exactly the extras
/// its classification implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LegislativeNode {
    Part(Part),
    Section(SectionHead),
    SectionWithSubsections(SubsectionSection),
    SectionWithSubsectionsWithIndentedDefinitions(SubsectionSection),
    SectionWithSubsectionsWithInlineDefinitions(SubsectionSection),
    SectionWithExternalReference(ReferenceSection),
    SectionWithContinuedText(ListSection),
    SectionWithList(ListSection),
    SectionWithCombinedDefinitions(DefinitionSection),
    SectionWithIndentedDefinitions(DefinitionSection),
    SectionWithInlineDefinitions(InlineDefinitionSection),
}

impl LegislativeNode {
    pub fn type_name(&self) -> &'static str {
        match self {
            LegislativeNode::Part(_) => "Part",
            LegislativeNode::Section(_) => "Section",
            LegislativeNode::SectionWithSubsections(_) => "SectionWithSubsections",
            LegislativeNode::SectionWithSubsectionsWithIndentedDefinitions(_) => {
                "SectionWithSubsectionsWithIndentedDefinitions"
            }
            LegislativeNode::SectionWithSubsectionsWithInlineDefinitions(_) => {
                "SectionWithSubsectionsWithInlineDefinitions"
            }
            LegislativeNode::SectionWithExternalReference(_) => "SectionWithExternalReference",
            LegislativeNode::SectionWithContinuedText(_) => "SectionWithContinuedText",
            LegislativeNode::SectionWithList(_) => "SectionWithList",
            LegislativeNode::SectionWithCombinedDefinitions(_) => "SectionWithCombinedDefinitions",
            LegislativeNode::SectionWithIndentedDefinitions(_) => "SectionWithIndentedDefinitions",
            LegislativeNode::SectionWithInlineDefinitions(_) => "SectionWithInlineDefinitions",
        }
    }

    pub fn as_part(&self) -> Option<&Part> {
        match self {
            LegislativeNode::Part(part) => Some(part),
            _ => None,
        }
    }

    /// The fields shared by every section tag; `None` for parts.
    pub fn head(&self) -> Option<&SectionHead> {
        match self {
            LegislativeNode::Part(_) => None,
            LegislativeNode::Section(head) => Some(head),
            LegislativeNode::SectionWithSubsections(section)
            | LegislativeNode::SectionWithSubsectionsWithIndentedDefinitions(section)
            | LegislativeNode::SectionWithSubsectionsWithInlineDefinitions(section) => {
                Some(&section.head)
            }
            LegislativeNode::SectionWithExternalReference(section) => Some(&section.head),
            LegislativeNode::SectionWithContinuedText(section)
            | LegislativeNode::SectionWithList(section) => Some(&section.head),
            LegislativeNode::SectionWithCombinedDefinitions(section)
            | LegislativeNode::SectionWithIndentedDefinitions(section) => Some(&section.head),
            LegislativeNode::SectionWithInlineDefinitions(section) => Some(&section.head),
        }
    }

    pub fn subsections(&self) -> &[Subsection] {
        match self {
            LegislativeNode::SectionWithSubsections(section)
            | LegislativeNode::SectionWithSubsectionsWithIndentedDefinitions(section)
            | LegislativeNode::SectionWithSubsectionsWithInlineDefinitions(section) => {
                &section.subsections
            }
            LegislativeNode::SectionWithExternalReference(section) => &section.subsections,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub part_id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheading: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionHead {
    pub section_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marginal_note: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsectionSection {
    #[serde(flatten)]
    pub head: SectionHead,
    pub subsections: Vec<Subsection>,
}

/// Either a subsection container whose subsections cite other statutes, or a
/// plain paragraph carrying citations of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSection {
    #[serde(flatten)]
    pub head: SectionHead,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsections: Vec<Subsection>,
    pub external_references: Vec<ExternalReference>,
}

/// `head.text` is the lead-in before the provision list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSection {
    #[serde(flatten)]
    pub head: SectionHead,
    pub items: Vec<ListItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continued_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionSection {
    #[serde(flatten)]
    pub head: SectionHead,
    pub definitions: Vec<Definition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defined_terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineDefinitionSection {
    #[serde(flatten)]
    pub head: SectionHead,
    pub defined_terms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marginal_note: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ListItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continued_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub definitions: Vec<Definition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defined_terms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_references: Vec<ExternalReference>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub definition_marginal_note: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_items: Vec<ListItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continued_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub term: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalReference {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}
