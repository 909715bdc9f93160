use crate::parser::dom::StatuteDom;
use crate::parser::markers;
use crate::parser::text::nullable_text;
use regex::Regex;
use std::sync::LazyLock;
use tl::NodeHandle;

static MARGINAL_NOTE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^marginal note\s*:\s*").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarginalNote {
    pub text: String,
    /// The note heads a definitions provision ("Definitions", "Definition of ...").
    pub is_definition: bool,
}

/// Amendment citations that follow `element`, up to the next unit boundary.
///
/// Every historical-note container met before the next section, marginal
/// note or part heading contributes, in encounter order, space-joined.
pub fn resolve_historical_note(dom: &StatuteDom, element: NodeHandle) -> Option<String> {
    let mut pieces: Vec<String> = Vec::new();

    for sibling in dom.following_siblings(element).iter().copied() {
        if markers::is_unit_boundary(dom, sibling) {
            break;
        }
        if markers::is_historical_note(dom, sibling) {
            pieces.extend(historical_note_items(dom, sibling));
        }
    }

    nullable_text(pieces.join(" "))
}

fn historical_note_items(dom: &StatuteDom, container: NodeHandle) -> Vec<String> {
    let items = dom.find_all(container, |handle| dom.is_tag(handle, "li"), |_| false);
    if items.is_empty() {
        return nullable_text(dom.text(container)).into_iter().collect();
    }

    items
        .into_iter()
        .filter_map(|item| {
            let links = dom.find_all(item, |handle| dom.is_tag(handle, "a"), |_| false);
            let text = if links.is_empty() {
                dom.text(item)
            } else {
                links
                    .into_iter()
                    .map(|link| dom.text(link))
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            nullable_text(text)
        })
        .collect()
}

/// The nearest marginal note before `element` among its siblings. The search
/// gives up at the previous section, part heading or historical note, since
/// anything beyond those belongs to another unit.
pub fn resolve_marginal_note(dom: &StatuteDom, element: NodeHandle) -> Option<MarginalNote> {
    for sibling in dom.preceding_siblings(element) {
        if markers::is_marginal_note(dom, sibling) {
            let raw = dom.text(sibling);
            let text = MARGINAL_NOTE_PREFIX_RE.replace(&raw, "").trim().to_string();
            if text.is_empty() {
                return None;
            }
            let is_definition = markers::is_definition_marginal_note(dom, sibling, &text);
            return Some(MarginalNote {
                text,
                is_definition,
            });
        }
        if markers::is_section_start(dom, sibling)
            || markers::is_part_heading(dom, sibling)
            || markers::is_historical_note(dom, sibling)
        {
            return None;
        }
    }
    None
}
