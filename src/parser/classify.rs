use crate::parser::dom::StatuteDom;
use crate::parser::extract::{
    extract_defined_terms, extract_definitions, extract_external_references, extract_list,
    has_definition_pairs,
};
use crate::parser::history::{resolve_historical_note, resolve_marginal_note};
use crate::parser::markers;
use crate::parser::subsections::extract_subsections;
use crate::parser::Diagnostics;
use crate::types::{
    Definition, DefinitionSection, ExternalReference, InlineDefinitionSection, LegislativeNode,
    ListItem, ListSection, ReferenceSection, SectionHead, Subsection, SubsectionSection,
};
use tl::NodeHandle;

/// Identity of a section element, settled by the walker before classifying.
#[derive(Clone)]
pub struct SectionIdentity {
    pub section_id: String,
    pub number: Option<String>,
    pub label_anchor: Option<NodeHandle>,
}

/// What the first matching rule found; becomes the payload of the tag.
#[derive(Debug)]
pub enum SectionBody {
    Subsections(Vec<Subsection>),
    ContinuedList {
        items: Vec<ListItem>,
        continued_text: String,
    },
    List(Vec<ListItem>),
    CombinedDefinitions {
        definitions: Vec<Definition>,
        defined_terms: Vec<String>,
    },
    IndentedDefinitions(Vec<Definition>),
    InlineDefinitions(Vec<String>),
    ExternalReferences(Vec<ExternalReference>),
    Plain,
}

type Rule = fn(&StatuteDom, &mut Diagnostics, NodeHandle) -> Option<SectionBody>;

/// Classification rules, highest precedence first. The first rule that
/// matches decides the tag.
const RULES: [(&str, Rule); 7] = [
    ("subsection-container", subsection_container),
    ("list-with-continuation", list_with_continuation),
    ("list", list),
    ("combined-definitions", combined_definitions),
    ("indented-definitions", indented_definitions),
    ("inline-definitions", inline_definitions),
    ("external-reference", external_reference),
];

pub fn classify(dom: &StatuteDom, diagnostics: &mut Diagnostics, element: NodeHandle) -> SectionBody {
    RULES
        .iter()
        .find_map(|(name, rule)| {
            let body = rule(dom, diagnostics, element)?;
            tracing::trace!("[Parser] rule {} matched", name);
            Some(body)
        })
        .unwrap_or(SectionBody::Plain)
}

/// Classifies `element` and assembles the tagged node with its marginal and
/// historical notes.
pub fn build_section(
    dom: &StatuteDom,
    diagnostics: &mut Diagnostics,
    element: NodeHandle,
    identity: SectionIdentity,
) -> LegislativeNode {
    let body = classify(dom, diagnostics, element);

    let mut marginal_note = resolve_marginal_note(dom, element).map(|note| note.text);
    let text = match &body {
        SectionBody::Subsections(subsections) => {
            if marginal_note.is_none() {
                marginal_note = subsections
                    .first()
                    .and_then(|subsection| subsection.marginal_note.clone());
            }
            join_subsection_text(subsections)
        }
        _ => {
            let anchor = identity.label_anchor.map(|anchor| anchor.get_inner());
            dom.text_excluding(element, |handle| anchor == Some(handle.get_inner()))
        }
    };

    let head = SectionHead {
        section_id: identity.section_id,
        number: identity.number,
        marginal_note,
        text,
        historical_note: resolve_historical_note(dom, element),
    };

    into_node(head, body)
}

fn into_node(head: SectionHead, body: SectionBody) -> LegislativeNode {
    match body {
        SectionBody::Subsections(subsections) => aggregate_subsections(head, subsections),
        SectionBody::ContinuedList {
            items,
            continued_text,
        } => LegislativeNode::SectionWithContinuedText(ListSection {
            head,
            items,
            continued_text: Some(continued_text),
        }),
        SectionBody::List(items) => LegislativeNode::SectionWithList(ListSection {
            head,
            items,
            continued_text: None,
        }),
        SectionBody::CombinedDefinitions {
            definitions,
            defined_terms,
        } => LegislativeNode::SectionWithCombinedDefinitions(DefinitionSection {
            head,
            definitions,
            defined_terms,
        }),
        SectionBody::IndentedDefinitions(definitions) => {
            LegislativeNode::SectionWithIndentedDefinitions(DefinitionSection {
                head,
                definitions,
                defined_terms: Vec::new(),
            })
        }
        SectionBody::InlineDefinitions(defined_terms) => {
            LegislativeNode::SectionWithInlineDefinitions(InlineDefinitionSection {
                head,
                defined_terms,
            })
        }
        SectionBody::ExternalReferences(external_references) => {
            LegislativeNode::SectionWithExternalReference(ReferenceSection {
                head,
                subsections: Vec::new(),
                external_references,
            })
        }
        SectionBody::Plain => LegislativeNode::Section(head),
    }
}

/// Sub-classifies a subsection container from what its subsections carry.
fn aggregate_subsections(head: SectionHead, subsections: Vec<Subsection>) -> LegislativeNode {
    if subsections
        .iter()
        .any(|subsection| !subsection.external_references.is_empty())
    {
        let external_references = subsections
            .iter()
            .flat_map(|subsection| subsection.external_references.iter().cloned())
            .collect();
        return LegislativeNode::SectionWithExternalReference(ReferenceSection {
            head,
            subsections,
            external_references,
        });
    }

    if subsections
        .iter()
        .any(|subsection| !subsection.definitions.is_empty())
    {
        return LegislativeNode::SectionWithSubsectionsWithIndentedDefinitions(SubsectionSection {
            head,
            subsections,
        });
    }

    if subsections.iter().any(|subsection| {
        subsection.definition_marginal_note || !subsection.defined_terms.is_empty()
    }) {
        return LegislativeNode::SectionWithSubsectionsWithInlineDefinitions(SubsectionSection {
            head,
            subsections,
        });
    }

    LegislativeNode::SectionWithSubsections(SubsectionSection { head, subsections })
}

fn join_subsection_text(subsections: &[Subsection]) -> String {
    subsections
        .iter()
        .map(|subsection| match &subsection.label {
            Some(label) if !subsection.text.is_empty() => format!("{label} {}", subsection.text),
            Some(label) => label.clone(),
            None => subsection.text.clone(),
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn following_list(dom: &StatuteDom, element: NodeHandle) -> Option<NodeHandle> {
    dom.next_element_sibling(element)
        .filter(|next| markers::is_provision_list(dom, *next))
}

fn following_definition_block(dom: &StatuteDom, element: NodeHandle) -> Option<NodeHandle> {
    dom.next_element_sibling(element)
        .filter(|next| markers::is_definition_block(dom, *next))
}

fn own_defined_terms(dom: &StatuteDom, element: NodeHandle) -> Vec<String> {
    extract_defined_terms(dom, element, |handle| markers::is_provision_list(dom, handle))
}

fn subsection_container(
    dom: &StatuteDom,
    diagnostics: &mut Diagnostics,
    element: NodeHandle,
) -> Option<SectionBody> {
    if !markers::is_subsection_container(dom, element) {
        return None;
    }
    Some(SectionBody::Subsections(extract_subsections(
        dom,
        diagnostics,
        element,
    )))
}

fn list_with_continuation(
    dom: &StatuteDom,
    diagnostics: &mut Diagnostics,
    element: NodeHandle,
) -> Option<SectionBody> {
    let list = following_list(dom, element)?;
    let continuation = dom
        .next_element_sibling(list)
        .filter(|next| markers::is_continuation(dom, *next))?;
    let items = extract_list(dom, diagnostics, list);
    if items.is_empty() {
        return None;
    }
    Some(SectionBody::ContinuedList {
        items,
        continued_text: dom.text(continuation),
    })
}

fn list(dom: &StatuteDom, diagnostics: &mut Diagnostics, element: NodeHandle) -> Option<SectionBody> {
    let list = following_list(dom, element)?;
    let items = extract_list(dom, diagnostics, list);
    if items.is_empty() {
        diagnostics.record(
            dom.id(element).as_deref(),
            "following provision list has no items; ignored",
        );
        return None;
    }
    Some(SectionBody::List(items))
}

fn combined_definitions(
    dom: &StatuteDom,
    diagnostics: &mut Diagnostics,
    element: NodeHandle,
) -> Option<SectionBody> {
    let block = following_definition_block(dom, element)?;
    if !has_definition_pairs(dom, block) {
        return None;
    }
    let defined_terms = own_defined_terms(dom, element);
    if defined_terms.is_empty() {
        return None;
    }
    Some(SectionBody::CombinedDefinitions {
        definitions: extract_definitions(dom, diagnostics, block),
        defined_terms,
    })
}

fn indented_definitions(
    dom: &StatuteDom,
    diagnostics: &mut Diagnostics,
    element: NodeHandle,
) -> Option<SectionBody> {
    let block = following_definition_block(dom, element)?;
    if !has_definition_pairs(dom, block) {
        diagnostics.record(
            dom.id(element).as_deref(),
            "following definition block has no term with a definition; ignored",
        );
        return None;
    }
    Some(SectionBody::IndentedDefinitions(extract_definitions(
        dom,
        diagnostics,
        block,
    )))
}

fn inline_definitions(
    dom: &StatuteDom,
    _diagnostics: &mut Diagnostics,
    element: NodeHandle,
) -> Option<SectionBody> {
    let defined_terms = own_defined_terms(dom, element);
    if defined_terms.is_empty() {
        return None;
    }
    Some(SectionBody::InlineDefinitions(defined_terms))
}

fn external_reference(
    dom: &StatuteDom,
    _diagnostics: &mut Diagnostics,
    element: NodeHandle,
) -> Option<SectionBody> {
    let references = extract_external_references(dom, element, |_| false);
    if references.is_empty() {
        return None;
    }
    Some(SectionBody::ExternalReferences(references))
}
