use crate::types::{LegislativeNode, SectionHead, StatuteDocument, Subsection};
use serde::Serialize;
use std::collections::BTreeMap;

/// Post-parse summary. Warnings never stop the output from being written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub parts: usize,
    pub sections: usize,
    pub subsections: usize,
    pub type_counts: BTreeMap<String, usize>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn log_summary(&self) {
        tracing::info!(
            "[Validate] {} parts, {} sections, {} subsections",
            self.parts,
            self.sections,
            self.subsections
        );
        for (tag, count) in &self.type_counts {
            tracing::info!("[Validate]   {}: {}", tag, count);
        }
        for warning in &self.warnings {
            tracing::warn!("[Validate] {}", warning);
        }
    }
}

/// Checks that every node carries the fields its tag implies.
pub fn validate_document(document: &StatuteDocument) -> ValidationReport {
    let mut report = ValidationReport::default();

    for node in &document.sections {
        *report
            .type_counts
            .entry(node.type_name().to_string())
            .or_default() += 1;

        match node {
            LegislativeNode::Part(part) => {
                report.parts += 1;
                if part.text.is_empty() {
                    report
                        .warnings
                        .push(format!("{} (Part): heading text is empty", part.part_id));
                }
                continue;
            }
            _ => report.sections += 1,
        }
        report.subsections += node.subsections().len();

        let problems = node_problems(node);
        if let Some(head) = node.head() {
            for problem in problems {
                report
                    .warnings
                    .push(format!("{} ({}): {}", head.section_id, node.type_name(), problem));
            }
        }
    }

    report
}

fn node_problems(node: &LegislativeNode) -> Vec<&'static str> {
    let mut problems = Vec::new();
    if let Some(head) = node.head() {
        head_problems(head, &mut problems);
    }

    match node {
        LegislativeNode::Part(_) | LegislativeNode::Section(_) => {}
        LegislativeNode::SectionWithSubsections(section) => {
            subsection_family_problems(&section.subsections, &mut problems);
            if section.subsections.iter().any(carries_definitions) {
                problems.push("subsections carry definitions");
            }
            if section.subsections.iter().any(carries_inline_definitions) {
                problems.push("subsections carry defined terms");
            }
        }
        LegislativeNode::SectionWithSubsectionsWithIndentedDefinitions(section) => {
            subsection_family_problems(&section.subsections, &mut problems);
            if !section.subsections.iter().any(carries_definitions) {
                problems.push("no subsection carries definitions");
            }
        }
        LegislativeNode::SectionWithSubsectionsWithInlineDefinitions(section) => {
            subsection_family_problems(&section.subsections, &mut problems);
            if !section.subsections.iter().any(carries_inline_definitions) {
                problems.push("no subsection carries a defined term or definition marginal note");
            }
            if section.subsections.iter().any(carries_definitions) {
                problems.push("subsections carry indented definitions");
            }
        }
        LegislativeNode::SectionWithExternalReference(section) => {
            if section.external_references.is_empty() {
                problems.push("missing external_references");
            }
        }
        LegislativeNode::SectionWithContinuedText(section) => {
            if section.items.is_empty() {
                problems.push("missing items");
            }
            if section.continued_text.is_none() {
                problems.push("missing continued_text");
            }
        }
        LegislativeNode::SectionWithList(section) => {
            if section.items.is_empty() {
                problems.push("missing items");
            }
            if section.continued_text.is_some() {
                problems.push("unexpected continued_text");
            }
        }
        LegislativeNode::SectionWithCombinedDefinitions(section) => {
            if section.definitions.is_empty() {
                problems.push("missing definitions");
            }
            if section.defined_terms.is_empty() {
                problems.push("missing defined_terms");
            }
        }
        LegislativeNode::SectionWithIndentedDefinitions(section) => {
            if section.definitions.is_empty() {
                problems.push("missing definitions");
            }
        }
        LegislativeNode::SectionWithInlineDefinitions(section) => {
            if section.defined_terms.is_empty() {
                problems.push("missing defined_terms");
            }
        }
    }

    problems
}

fn head_problems(head: &SectionHead, problems: &mut Vec<&'static str>) {
    if head.number.is_none() {
        problems.push("missing number");
    }
    if head.text.is_empty() {
        problems.push("text is empty");
    }
}

fn subsection_family_problems(subsections: &[Subsection], problems: &mut Vec<&'static str>) {
    if subsections.is_empty() {
        problems.push("missing subsections");
    }
    if subsections
        .iter()
        .any(|subsection| !subsection.external_references.is_empty())
    {
        problems.push("subsections carry external references");
    }
}

fn carries_definitions(subsection: &Subsection) -> bool {
    !subsection.definitions.is_empty()
}

fn carries_inline_definitions(subsection: &Subsection) -> bool {
    subsection.definition_marginal_note || !subsection.defined_terms.is_empty()
}
