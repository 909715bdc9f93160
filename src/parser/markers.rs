//! Class and tag conventions of the consolidated statute markup.

use crate::parser::dom::StatuteDom;
use regex::Regex;
use std::sync::LazyLock;
use tl::NodeHandle;

static DEFINITION_NOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:definitions?|definition of\b)").unwrap());

/// Containers whose content is a rendering artifact rather than statute text.
const ARTIFACT_CLASSES: [&str; 4] = ["HistoricalNote", "AmendedText", "wb-invisible", "mfp-hide"];

pub fn is_part_heading(dom: &StatuteDom, handle: NodeHandle) -> bool {
    dom.matches(handle, "h2", "Part")
}

pub fn is_subheading(dom: &StatuteDom, handle: NodeHandle) -> bool {
    dom.matches(handle, "h3", "Subheading")
}

/// `p.Section`: a section that is a single paragraph.
pub fn is_section_paragraph(dom: &StatuteDom, handle: NodeHandle) -> bool {
    dom.matches(handle, "p", "Section")
}

/// `ul.Section`: a section split into subsection list items.
pub fn is_subsection_container(dom: &StatuteDom, handle: NodeHandle) -> bool {
    (dom.is_tag(handle, "ul") || dom.is_tag(handle, "ol")) && dom.has_class(handle, "Section")
}

pub fn is_section_start(dom: &StatuteDom, handle: NodeHandle) -> bool {
    is_section_paragraph(dom, handle) || is_subsection_container(dom, handle)
}

pub fn is_marginal_note(dom: &StatuteDom, handle: NodeHandle) -> bool {
    dom.has_class(handle, "MarginalNote") || dom.has_class(handle, "MarginalNoteDefinedTerm")
}

pub fn is_definition_marginal_note(dom: &StatuteDom, handle: NodeHandle, text: &str) -> bool {
    dom.has_class(handle, "MarginalNoteDefinedTerm") || DEFINITION_NOTE_RE.is_match(text)
}

/// Where a historical-note search stops: the next unit has begun.
pub fn is_unit_boundary(dom: &StatuteDom, handle: NodeHandle) -> bool {
    is_section_start(dom, handle) || is_marginal_note(dom, handle) || is_part_heading(dom, handle)
}

pub fn is_provision_list(dom: &StatuteDom, handle: NodeHandle) -> bool {
    (dom.is_tag(handle, "ul") || dom.is_tag(handle, "ol"))
        && dom.has_class(handle, "ProvisionList")
        && !dom.has_class(handle, "Section")
}

pub fn is_continuation(dom: &StatuteDom, handle: NodeHandle) -> bool {
    dom.is_tag(handle, "p") && dom.has_class_prefix(handle, "Continued")
}

pub fn is_definition_block(dom: &StatuteDom, handle: NodeHandle) -> bool {
    dom.is_tag(handle, "dl") && dom.has_class(handle, "Definition")
}

pub fn is_historical_note(dom: &StatuteDom, handle: NodeHandle) -> bool {
    dom.has_class(handle, "HistoricalNote")
}

pub fn is_external_reference(dom: &StatuteDom, handle: NodeHandle) -> bool {
    dom.has_class_prefix(handle, "XRefExternal")
}

pub fn is_defined_term(dom: &StatuteDom, handle: NodeHandle) -> bool {
    dom.is_tag(handle, "dfn")
}

pub fn is_section_label(dom: &StatuteDom, handle: NodeHandle) -> bool {
    (dom.is_tag(handle, "a") || dom.is_tag(handle, "span")) && dom.has_class(handle, "sectionLabel")
}

pub fn is_law_label(dom: &StatuteDom, handle: NodeHandle) -> bool {
    dom.matches(handle, "span", "lawlabel")
}

pub fn is_artifact_container(dom: &StatuteDom, handle: NodeHandle) -> bool {
    let classes = dom.classes(handle);
    classes
        .iter()
        .any(|class| ARTIFACT_CLASSES.contains(&class.as_str()))
        || dom.has_attr(handle, "hidden")
}

/// True when any ancestor of `handle` is a rendering artifact.
pub fn is_inside_artifact(dom: &StatuteDom, handle: NodeHandle) -> bool {
    dom.ancestors(handle)
        .into_iter()
        .any(|ancestor| is_artifact_container(dom, ancestor))
}
