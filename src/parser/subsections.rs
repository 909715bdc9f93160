use crate::parser::dom::StatuteDom;
use crate::parser::extract::{
    extract_defined_terms, extract_definitions, extract_external_references, extract_list,
    labelled_text, section_label_anchor,
};
use crate::parser::history::resolve_marginal_note;
use crate::parser::markers;
use crate::parser::Diagnostics;
use crate::types::Subsection;
use tl::NodeHandle;

/// One `Subsection` per `li` of a subsection container, in source order.
pub fn extract_subsections(
    dom: &StatuteDom,
    diagnostics: &mut Diagnostics,
    container: NodeHandle,
) -> Vec<Subsection> {
    dom.element_children(container)
        .iter()
        .copied()
        .filter(|child| dom.is_tag(*child, "li"))
        .enumerate()
        .filter_map(|(index, item)| extract_subsection(dom, diagnostics, item, index == 0))
        .collect()
}

fn extract_subsection(
    dom: &StatuteDom,
    diagnostics: &mut Diagnostics,
    item: NodeHandle,
    is_first: bool,
) -> Option<Subsection> {
    let children = dom.element_children(item);
    let Some(paragraph) = children
        .iter()
        .copied()
        .find(|child| dom.matches(*child, "p", "Subsection"))
    else {
        diagnostics.record(
            dom.id(item).as_deref(),
            "subsection item has no body paragraph; skipped",
        );
        return None;
    };

    let marginal_note = resolve_marginal_note(dom, paragraph);

    // The first item's label carries the section number anchor, which belongs
    // to the section rather than to this subsection.
    let section_anchor = if is_first {
        section_label_anchor(dom, paragraph).map(|anchor| anchor.get_inner())
    } else {
        None
    };
    let (label, text) = labelled_text(dom, paragraph, |handle| {
        section_anchor == Some(handle.get_inner())
    });
    if text.is_empty() {
        diagnostics.record(dom.id(paragraph).as_deref(), "subsection paragraph has no text");
    }

    let items = children
        .iter()
        .copied()
        .find(|child| markers::is_provision_list(dom, *child))
        .map(|list| extract_list(dom, diagnostics, list))
        .unwrap_or_default();

    let continued_text = children
        .iter()
        .copied()
        .filter(|child| markers::is_continuation(dom, *child))
        .map(|child| dom.text(child))
        .find(|text| !text.is_empty());

    let mut definitions = Vec::new();
    for block in children
        .iter()
        .copied()
        .filter(|child| markers::is_definition_block(dom, *child))
    {
        definitions.extend(extract_definitions(dom, diagnostics, block));
    }

    let defined_terms = extract_defined_terms(dom, paragraph, |_| false);
    let external_references = extract_external_references(dom, item, |handle| {
        markers::is_historical_note(dom, handle) || markers::is_marginal_note(dom, handle)
    });

    let (marginal_note, definition_marginal_note) = match marginal_note {
        Some(note) => (Some(note.text), note.is_definition),
        None => (None, false),
    };

    Some(Subsection {
        label,
        marginal_note,
        text,
        items,
        continued_text,
        definitions,
        defined_terms,
        external_references,
        definition_marginal_note,
    })
}
