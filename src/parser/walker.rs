use crate::parser::classify::{build_section, SectionIdentity};
use crate::parser::dom::StatuteDom;
use crate::parser::extract::{section_label_anchor, section_number};
use crate::parser::markers;
use crate::parser::metadata::extract_metadata;
use crate::parser::text::nullable_text;
use crate::parser::{Diagnostic, Diagnostics};
use crate::runtime::logging::{log_event, LogLevel};
use crate::types::{LegislativeNode, Part, StatuteDocument};
use serde_json::json;
use std::collections::HashSet;
use tl::NodeHandle;

/// Result of one parse: the document plus everything the parser recovered from.
#[derive(Debug)]
pub struct ParseOutcome {
    pub document: StatuteDocument,
    pub diagnostics: Vec<Diagnostic>,
    pub duplicates_skipped: usize,
}

/// Parses a consolidated statute page into its ordered list of parts and
/// classified sections. Only an unreadable document is an error; malformed
/// fragments are skipped and reported in the outcome.
pub fn parse_statute_html(html: &str) -> Result<ParseOutcome, String> {
    let dom = StatuteDom::parse(html)?;
    let metadata = extract_metadata(&dom);

    let mut walker = DocumentWalker::new(&dom);
    walker.walk();

    tracing::info!(
        "[Parser] Parsed {} nodes ({} duplicates skipped, {} diagnostics)",
        walker.nodes.len(),
        walker.duplicates_skipped,
        walker.diagnostics.len()
    );

    Ok(ParseOutcome {
        document: StatuteDocument {
            metadata,
            sections: walker.nodes,
        },
        diagnostics: walker.diagnostics.into_vec(),
        duplicates_skipped: walker.duplicates_skipped,
    })
}

struct DocumentWalker<'d, 'a> {
    dom: &'d StatuteDom<'a>,
    diagnostics: Diagnostics,
    seen_ids: HashSet<String>,
    seen_numbers: HashSet<String>,
    nodes: Vec<LegislativeNode>,
    duplicates_skipped: usize,
    generated_parts: usize,
    generated_sections: usize,
}

impl<'d, 'a> DocumentWalker<'d, 'a> {
    fn new(dom: &'d StatuteDom<'a>) -> Self {
        Self {
            dom,
            diagnostics: Diagnostics::default(),
            seen_ids: HashSet::new(),
            seen_numbers: HashSet::new(),
            nodes: Vec::new(),
            duplicates_skipped: 0,
            generated_parts: 0,
            generated_sections: 0,
        }
    }

    fn walk(&mut self) {
        let dom = self.dom;
        for element in dom.elements().iter().copied() {
            let is_part = markers::is_part_heading(dom, element);
            if !is_part && !markers::is_section_start(dom, element) {
                continue;
            }
            if markers::is_inside_artifact(dom, element) {
                tracing::debug!("[Parser] Skipping unit inside amendment artifact");
                continue;
            }
            if is_part {
                self.emit_part(element);
            } else {
                self.emit_section(element);
            }
        }
    }

    fn emit_part(&mut self, element: NodeHandle) {
        let dom = self.dom;
        let part_id = dom.id(element).unwrap_or_else(|| {
            self.generated_parts += 1;
            format!("generated-part-{}", self.generated_parts)
        });
        if !self.seen_ids.insert(part_id.clone()) {
            self.skip_duplicate(&part_id, None);
            return;
        }

        let text = dom.text(element);
        if text.is_empty() {
            self.diagnostics
                .record(Some(part_id.as_str()), "part heading has no text");
        }
        let subheading = dom
            .next_element_sibling(element)
            .filter(|next| markers::is_subheading(dom, *next))
            .and_then(|next| nullable_text(dom.text(next)));

        self.nodes.push(LegislativeNode::Part(Part {
            part_id,
            text,
            subheading,
        }));
    }

    fn emit_section(&mut self, element: NodeHandle) {
        let dom = self.dom;
        let label_anchor = section_label_anchor(dom, element);
        let number = label_anchor.and_then(|anchor| section_number(dom, anchor));

        let section_id = dom
            .id(element)
            .or_else(|| label_anchor.and_then(|anchor| dom.id(anchor)))
            .or_else(|| number.as_ref().map(|number| format!("generated-{number}")))
            .unwrap_or_else(|| {
                self.generated_sections += 1;
                format!("generated-section-{}", self.generated_sections)
            });
        if number.is_none() {
            self.diagnostics
                .record(Some(section_id.as_str()), "section has no section-number label");
        }

        let duplicate_number = number
            .as_ref()
            .is_some_and(|number| self.seen_numbers.contains(number));
        if duplicate_number || self.seen_ids.contains(&section_id) {
            self.skip_duplicate(&section_id, number.as_deref());
            return;
        }
        self.seen_ids.insert(section_id.clone());
        if let Some(number) = &number {
            self.seen_numbers.insert(number.clone());
        }

        let node = build_section(
            dom,
            &mut self.diagnostics,
            element,
            SectionIdentity {
                section_id,
                number,
                label_anchor,
            },
        );
        self.nodes.push(node);
    }

    fn skip_duplicate(&mut self, id: &str, number: Option<&str>) {
        self.duplicates_skipped += 1;
        log_event(
            LogLevel::Info,
            "Skipping duplicate unit",
            Some(json!({ "id": id, "number": number })),
        );
    }
}
