use crate::parser::dom::StatuteDom;
use crate::parser::markers;
use crate::parser::text::nullable_text;
use crate::parser::Diagnostics;
use crate::types::{Definition, ExternalReference, ListItem};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tl::NodeHandle;

static LEADING_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\([0-9A-Za-z.]+\))\s*(.*)$").unwrap());

/// Recursively extracts every `li` of a provision list.
pub fn extract_list(dom: &StatuteDom, diagnostics: &mut Diagnostics, list: NodeHandle) -> Vec<ListItem> {
    dom.element_children(list)
        .iter()
        .copied()
        .filter(|child| dom.is_tag(*child, "li"))
        .map(|item| extract_list_item(dom, diagnostics, item))
        .collect()
}

fn extract_list_item(dom: &StatuteDom, diagnostics: &mut Diagnostics, item: NodeHandle) -> ListItem {
    let children = dom.element_children(item);
    let nested_position = children
        .iter()
        .position(|child| markers::is_provision_list(dom, *child));
    let paragraph = children.iter().copied().find(|child| {
        dom.is_tag(*child, "p")
            && !markers::is_continuation(dom, *child)
            && !markers::is_marginal_note(dom, *child)
    });

    let (label, text) = match paragraph {
        Some(paragraph) => labelled_text(dom, paragraph, |_| false),
        None => {
            diagnostics.record(
                dom.id(item).as_deref(),
                "provision list item has no paragraph wrapper; using the item text",
            );
            labelled_text(dom, item, |handle| {
                markers::is_provision_list(dom, handle) || markers::is_continuation(dom, handle)
            })
        }
    };

    let sub_items = nested_position
        .map(|position| extract_list(dom, diagnostics, children[position]))
        .unwrap_or_default();

    let continued_text = nested_position.and_then(|position| {
        children[position + 1..]
            .iter()
            .copied()
            .filter(|child| markers::is_continuation(dom, *child))
            .map(|child| dom.text(child))
            .find(|text| !text.is_empty())
    });

    ListItem {
        label,
        text,
        sub_items,
        continued_text,
    }
}

/// Splits a provision paragraph into its leading label token, e.g. `(a)`,
/// and the remaining text. The `span.lawlabel` marker wins; otherwise a
/// parenthesised token at the very start of the text is taken.
pub fn labelled_text<F>(dom: &StatuteDom, paragraph: NodeHandle, exclude: F) -> (Option<String>, String)
where
    F: Fn(NodeHandle) -> bool,
{
    let label_node = dom
        .find_all(paragraph, |handle| markers::is_law_label(dom, handle), &exclude)
        .into_iter()
        .next();

    if let Some(label_node) = label_node {
        let label = nullable_text(dom.text(label_node));
        let label_index = label_node.get_inner();
        let text = dom.text_excluding(paragraph, |handle| {
            exclude(handle) || handle.get_inner() == label_index
        });
        return (label, text);
    }

    let text = dom.text_excluding(paragraph, &exclude);
    split_leading_label(&text)
}

pub fn split_leading_label(text: &str) -> (Option<String>, String) {
    match LEADING_LABEL_RE.captures(text) {
        Some(caps) => (Some(caps[1].to_string()), caps[2].trim().to_string()),
        None => (None, text.to_string()),
    }
}

/// Pairs each `dt` with the `dd` right after it. A term without a body is
/// dropped and reported.
pub fn extract_definitions(
    dom: &StatuteDom,
    diagnostics: &mut Diagnostics,
    block: NodeHandle,
) -> Vec<Definition> {
    let entries = definition_entries(dom, block);
    let mut definitions = Vec::new();

    for (index, entry) in entries.iter().copied().enumerate() {
        if !dom.is_tag(entry, "dt") {
            continue;
        }
        let term = defined_term_text(dom, entry);
        let Some(body) = entries
            .get(index + 1)
            .copied()
            .filter(|next| dom.is_tag(*next, "dd"))
        else {
            diagnostics.record(
                dom.id(entry).as_deref(),
                format!("defined term \"{term}\" has no definition body; dropped"),
            );
            continue;
        };
        if term.is_empty() {
            diagnostics.record(dom.id(entry).as_deref(), "definition term marker is empty; dropped");
            continue;
        }

        let items = dom
            .find_all(body, |handle| markers::is_provision_list(dom, handle), |_| false)
            .into_iter()
            .next()
            .map(|list| extract_list(dom, diagnostics, list))
            .unwrap_or_default();
        let text = dom.text_excluding(body, |handle| markers::is_provision_list(dom, handle));

        definitions.push(Definition { term, text, items });
    }

    definitions
}

/// True when at least one non-empty `dt` is directly followed by a `dd`,
/// i.e. `extract_definitions` would return something.
pub fn has_definition_pairs(dom: &StatuteDom, block: NodeHandle) -> bool {
    definition_entries(dom, block).windows(2).any(|pair| {
        dom.is_tag(pair[0], "dt")
            && dom.is_tag(pair[1], "dd")
            && !defined_term_text(dom, pair[0]).is_empty()
    })
}

/// `dt`/`dd` children of a definition block; `div` groups are flattened.
fn definition_entries(dom: &StatuteDom, block: NodeHandle) -> Vec<NodeHandle> {
    let mut entries = Vec::new();
    for child in dom.element_children(block).iter().copied() {
        if dom.is_tag(child, "div") {
            entries.extend(dom.element_children(child).iter().copied());
        } else {
            entries.push(child);
        }
    }
    entries
}

fn defined_term_text(dom: &StatuteDom, term: NodeHandle) -> String {
    dom.find_all(term, |handle| markers::is_defined_term(dom, handle), |_| false)
        .into_iter()
        .map(|dfn| dom.text(dfn))
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| dom.text(term))
}

/// Inline `dfn` terms of `scope`, first occurrence order, duplicates removed.
pub fn extract_defined_terms<F>(dom: &StatuteDom, scope: NodeHandle, prune: F) -> Vec<String>
where
    F: Fn(NodeHandle) -> bool,
{
    let mut seen = HashSet::new();
    dom.find_all(scope, |handle| markers::is_defined_term(dom, handle), prune)
        .into_iter()
        .map(|dfn| dom.text(dfn))
        .filter(|term| !term.is_empty() && seen.insert(term.clone()))
        .collect()
}

pub fn extract_external_references<F>(
    dom: &StatuteDom,
    scope: NodeHandle,
    prune: F,
) -> Vec<ExternalReference>
where
    F: Fn(NodeHandle) -> bool,
{
    dom.find_all(scope, |handle| markers::is_external_reference(dom, handle), prune)
        .into_iter()
        .filter_map(|reference| {
            let text = nullable_text(dom.text(reference))?;
            let href = reference_href(dom, reference);
            Some(ExternalReference { text, href })
        })
        .collect()
}

fn reference_href(dom: &StatuteDom, reference: NodeHandle) -> Option<String> {
    let anchor = if dom.is_tag(reference, "a") {
        Some(reference)
    } else {
        dom.find_descendant(reference, |handle| dom.is_tag(handle, "a"))
    };
    anchor
        .and_then(|anchor| dom.attr(anchor, "href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// The section-number anchor (`a.sectionLabel`) of a section element, not
/// looking inside nested provision lists.
pub fn section_label_anchor(dom: &StatuteDom, element: NodeHandle) -> Option<NodeHandle> {
    dom.find_all(
        element,
        |handle| markers::is_section_label(dom, handle),
        |handle| markers::is_provision_list(dom, handle),
    )
    .into_iter()
    .next()
}

pub fn section_number(dom: &StatuteDom, anchor: NodeHandle) -> Option<String> {
    let number = dom.text(anchor);
    nullable_text(number.trim_end_matches('.').trim().to_string())
}
