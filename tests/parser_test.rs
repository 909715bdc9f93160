mod common;

use common::{excerpt, find_section, load_fixture, parse_fixture, render_provision_list, EXCERPT_FIXTURE};
use statute_ingest::ingest::to_pretty_json;
use statute_ingest::parser::dom::StatuteDom;
use statute_ingest::parser::extract::extract_list;
use statute_ingest::parser::markers::is_provision_list;
use statute_ingest::parser::parse_statute_html;
use statute_ingest::parser::validate::validate_document;
use statute_ingest::parser::Diagnostics;
use statute_ingest::types::{ExternalReference, LegislativeNode, ListItem};

fn item(label: &str, text: &str) -> ListItem {
    ListItem {
        label: Some(label.to_string()),
        text: text.to_string(),
        ..ListItem::default()
    }
}

// ============================================================
// Document Walk
// ============================================================

#[test]
fn emits_parts_and_sections_in_source_order() {
    let document = excerpt();
    let tags: Vec<(&str, String)> = document
        .sections
        .iter()
        .map(|node| {
            let id = match node {
                LegislativeNode::Part(part) => part.part_id.clone(),
                other => other.head().unwrap().section_id.clone(),
            };
            (node.type_name(), id)
        })
        .collect();

    let expected = vec![
        ("Part", "h-1"),
        ("SectionWithExternalReference", "s-1"),
        ("Part", "h-2"),
        ("SectionWithIndentedDefinitions", "s-2"),
        ("SectionWithCombinedDefinitions", "s-3"),
        ("SectionWithInlineDefinitions", "s-5"),
        ("Section", "s-6"),
        ("Part", "h-3"),
        ("SectionWithSubsectionsWithIndentedDefinitions", "s-84"),
        ("SectionWithSubsections", "s-91"),
        ("SectionWithSubsectionsWithInlineDefinitions", "s-150"),
        ("SectionWithList", "s-180"),
        ("SectionWithContinuedText", "s-181"),
        ("SectionWithExternalReference", "s-467.1"),
    ];
    let expected: Vec<(&str, String)> = expected
        .into_iter()
        .map(|(tag, id)| (tag, id.to_string()))
        .collect();
    assert_eq!(tags, expected);
}

#[test]
fn extracts_dcterms_metadata() {
    let document = excerpt();
    assert_eq!(document.metadata.len(), 6);
    assert_eq!(document.metadata["title"], "Criminal Code");
    assert_eq!(document.metadata["creator"], "Legislative Services Branch");
    assert_eq!(document.metadata["subject"], "Criminal law; Offences & punishment");
    assert_eq!(document.metadata["language"], "eng");
    assert!(!document.metadata.contains_key("description"));
}

#[test]
fn parts_carry_heading_and_subheading() {
    let document = excerpt();
    let parts: Vec<_> = document.sections.iter().filter_map(|node| node.as_part()).collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0].text, "Short Title");
    assert_eq!(parts[0].subheading, None);
    assert_eq!(parts[2].text, "PART I General");
    assert_eq!(parts[2].subheading.as_deref(), Some("Offences"));
}

#[test]
fn skips_units_inside_rendering_artifacts() {
    let document = excerpt();
    assert!(document.sections.iter().all(|node| match node {
        LegislativeNode::Part(part) => part.part_id != "h-popup",
        other => {
            let head = other.head().unwrap();
            head.section_id != "s-7-amended" && head.section_id != "s-8-history"
        }
    }));
}

#[test]
fn skips_section_quoted_inside_historical_note() {
    let document = excerpt();
    assert!(document
        .sections
        .iter()
        .filter_map(|node| node.head())
        .all(|head| head.number.as_deref() != Some("8")));

    let html = r#"<div>
<p class="Section" id="s-1"><a class="sectionLabel">1</a> One.</p>
<div class="HistoricalNote"><p class="Section" id="s-2"><a class="sectionLabel">2</a> Quoted.</p></div>
</div>"#;
    let outcome = parse_statute_html(html).unwrap();
    assert_eq!(outcome.document.sections.len(), 1);
    assert_eq!(outcome.duplicates_skipped, 0);
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn keeps_first_of_two_sections_sharing_a_number() {
    let outcome = parse_fixture(EXCERPT_FIXTURE);
    assert_eq!(outcome.duplicates_skipped, 1);

    let sixes: Vec<_> = outcome
        .document
        .sections
        .iter()
        .filter_map(|node| node.head())
        .filter(|head| head.number.as_deref() == Some("6"))
        .collect();
    assert_eq!(sixes.len(), 1);
    assert_eq!(sixes[0].section_id, "s-6");
}

#[test]
fn deduplicates_by_identifier_without_error() {
    let html = r#"<div>
<p class="Section" id="s-10"><a class="sectionLabel">10</a> First rendering.</p>
<p class="Section" id="s-10"><a class="sectionLabel">10A</a> Second rendering.</p>
</div>"#;
    let outcome = parse_statute_html(html).unwrap();
    assert_eq!(outcome.document.sections.len(), 1);
    assert_eq!(outcome.duplicates_skipped, 1);
    assert_eq!(outcome.document.sections[0].head().unwrap().text, "First rendering.");
}

#[test]
fn generates_identifiers_when_markup_has_none() {
    let html = r#"<div>
<h2 class="Part">PART XII</h2>
<p class="Section"><a class="sectionLabel">12</a> A section without an id.</p>
</div>"#;
    let outcome = parse_statute_html(html).unwrap();
    let part = outcome.document.sections[0].as_part().unwrap();
    assert_eq!(part.part_id, "generated-part-1");
    let head = outcome.document.sections[1].head().unwrap();
    assert_eq!(head.section_id, "generated-12");
    assert_eq!(head.number.as_deref(), Some("12"));
}

#[test]
fn reports_malformed_fragments_as_diagnostics() {
    let outcome = parse_fixture(EXCERPT_FIXTURE);
    let elements: Vec<_> = outcome
        .diagnostics
        .iter()
        .map(|diagnostic| diagnostic.element.as_deref())
        .collect();
    assert_eq!(elements, vec![Some("s-2-dt-orphan"), Some("s-91-stray")]);
}

#[test]
fn reparsing_yields_identical_output() {
    let html = load_fixture(EXCERPT_FIXTURE);
    let first = to_pretty_json(&parse_statute_html(&html).unwrap().document).unwrap();
    let second = to_pretty_json(&parse_statute_html(&html).unwrap().document).unwrap();
    assert_eq!(first, second);
}

// ============================================================
// Section Classification
// ============================================================

#[test]
fn section_text_excludes_its_number() {
    let document = excerpt();
    let head = find_section(&document, "s-6").head().unwrap();
    assert_eq!(head.number.as_deref(), Some("6"));
    assert_eq!(head.text, "Nothing in this Act affects the law relating to judicial acts.");
    assert_eq!(head.marginal_note.as_deref(), Some("Effect of judicial acts"));
}

#[test]
fn paragraph_citation_becomes_external_reference() {
    let document = excerpt();
    let LegislativeNode::SectionWithExternalReference(section) = find_section(&document, "s-1") else {
        panic!("s-1 should carry an external reference");
    };
    assert_eq!(section.head.text, "This Act may be cited as the Criminal Code.");
    assert!(section.subsections.is_empty());
    assert_eq!(
        section.external_references,
        vec![ExternalReference {
            text: "Criminal Code".to_string(),
            href: None,
        }]
    );
    assert_eq!(
        section.head.historical_note.as_deref(),
        Some("R.S., 1985, c. C-46, s. 1")
    );
}

#[test]
fn definition_block_pairs_terms_and_drops_orphans() {
    let document = excerpt();
    let LegislativeNode::SectionWithIndentedDefinitions(section) = find_section(&document, "s-2") else {
        panic!("s-2 should be an indented-definitions section");
    };
    assert_eq!(section.head.text, "In this Act,");
    assert_eq!(section.head.marginal_note.as_deref(), Some("Definitions"));
    let terms: Vec<_> = section.definitions.iter().map(|d| d.term.as_str()).collect();
    assert_eq!(terms, vec!["Attorney General", "bank-note"]);
    assert_eq!(
        section.definitions[0].text,
        "Attorney General means the Attorney General of Canada;"
    );
    assert_eq!(
        section.definitions[1].text,
        "bank-note includes any negotiable instrument"
    );
    assert_eq!(
        section.definitions[1].items,
        vec![
            item(
                "(a)",
                "issued by or on behalf of a person carrying on the business of banking, and"
            ),
            item("(b)", "intended to be used as money;"),
        ]
    );
    assert!(section.defined_terms.is_empty());
    assert_eq!(
        section.head.historical_note.as_deref(),
        Some("R.S., 1985, c. 27 (1st Supp.), s. 2")
    );
}

#[test]
fn inline_term_with_block_is_combined() {
    let document = excerpt();
    let LegislativeNode::SectionWithCombinedDefinitions(section) = find_section(&document, "s-3") else {
        panic!("s-3 should be a combined-definitions section");
    };
    assert_eq!(section.defined_terms, vec!["public officer"]);
    assert_eq!(section.definitions.len(), 1);
    assert_eq!(section.definitions[0].term, "peace officer");
    assert_eq!(
        section.definitions[0].text,
        "a peace officer within the meaning of section 2."
    );
    assert_eq!(section.head.historical_note, None);
}

#[test]
fn inline_terms_without_block() {
    let document = excerpt();
    let LegislativeNode::SectionWithInlineDefinitions(section) = find_section(&document, "s-5") else {
        panic!("s-5 should be an inline-definitions section");
    };
    assert_eq!(section.defined_terms, vec!["every one", "person"]);
    assert_eq!(section.head.text, "In this Act, every one and person include His Majesty.");
    assert_eq!(section.head.marginal_note.as_deref(), Some("Definition of every one"));
}

#[test]
fn merges_consecutive_historical_notes_up_to_next_unit() {
    let document = excerpt();
    let head = find_section(&document, "s-6").head().unwrap();
    assert_eq!(
        head.historical_note.as_deref(),
        Some("R.S., c. C-34, s. 6 1995, c. 22, s. 1 2019, c. 25, s. 2")
    );
}

#[test]
fn historical_note_stops_at_next_section() {
    let html = r#"<div>
<p class="Section" id="s-1"><a class="sectionLabel">1</a> One.</p>
<div class="HistoricalNote"><ul><li>first</li></ul></div>
<div class="HistoricalNote"><ul><li>second</li></ul></div>
<p class="Section" id="s-2"><a class="sectionLabel">2</a> Two.</p>
<div class="HistoricalNote"><ul><li>third</li></ul></div>
</div>"#;
    let outcome = parse_statute_html(html).unwrap();
    let notes: Vec<_> = outcome
        .document
        .sections
        .iter()
        .map(|node| node.head().unwrap().historical_note.clone())
        .collect();
    assert_eq!(
        notes,
        vec![Some("first second".to_string()), Some("third".to_string())]
    );
}

#[test]
fn list_section_keeps_nested_lists_and_continuations() {
    let document = excerpt();
    let LegislativeNode::SectionWithList(section) = find_section(&document, "s-180") else {
        panic!("s-180 should be a list section");
    };
    assert_eq!(section.head.text, "Every person commits a common nuisance who");
    assert_eq!(section.continued_text, None);
    assert_eq!(section.items.len(), 2);

    let first = &section.items[0];
    assert_eq!(first.label.as_deref(), Some("(a)"));
    assert_eq!(first.text, "endangers the lives of the public; or");
    assert_eq!(
        first.sub_items,
        vec![
            item("(i)", "by an unlawful act,"),
            item("(ii)", "by failing to discharge a legal duty,"),
        ]
    );
    assert_eq!(first.continued_text.as_deref(), Some("and thereby causes harm."));
    assert_eq!(
        section.items[1],
        item("(b)", "obstructs the public in the exercise of a right.")
    );
}

#[test]
fn continuation_after_list_keeps_em_dash() {
    let document = excerpt();
    let LegislativeNode::SectionWithContinuedText(section) = find_section(&document, "s-181") else {
        panic!("s-181 should be a continued-text section");
    };
    assert_eq!(section.head.number.as_deref(), Some("181"));
    assert_eq!(section.items.len(), 2);
    assert_eq!(
        section.continued_text.as_deref(),
        Some("is guilty of an indictable offence \u{2014} liable to imprisonment for a term of not more than two years.")
    );
}

#[test]
fn list_extraction_round_trips_through_markup() {
    let document = excerpt();
    let LegislativeNode::SectionWithList(section) = find_section(&document, "s-180") else {
        panic!("s-180 should be a list section");
    };

    let html = render_provision_list(&section.items);
    let dom = StatuteDom::parse(&html).unwrap();
    let list = dom
        .elements()
        .iter()
        .copied()
        .find(|handle| is_provision_list(&dom, *handle))
        .unwrap();
    let mut diagnostics = Diagnostics::default();

    assert_eq!(extract_list(&dom, &mut diagnostics, list), section.items);
    assert!(diagnostics.is_empty());
}

// ============================================================
// Subsections
// ============================================================

#[test]
fn first_subsection_excludes_section_anchor() {
    let document = excerpt();
    let LegislativeNode::SectionWithSubsections(section) = find_section(&document, "s-91") else {
        panic!("s-91 should be a subsection section");
    };
    assert_eq!(section.head.number.as_deref(), Some("91"));
    assert_eq!(
        section.head.marginal_note.as_deref(),
        Some("Unauthorized possession of firearm")
    );

    let first = &section.subsections[0];
    assert_eq!(first.label.as_deref(), Some("(1)"));
    assert_eq!(
        first.text,
        "Subject to subsection (4), every person commits an offence who possesses a firearm."
    );
    assert!(!first.text.contains("91"));
}

#[test]
fn skips_subsection_without_body_paragraph() {
    let document = excerpt();
    let section = find_section(&document, "s-91");
    let subsections = section.subsections();
    assert_eq!(subsections.len(), 2);

    let third = &subsections[1];
    assert_eq!(third.label.as_deref(), Some("(3)"));
    assert_eq!(third.marginal_note.as_deref(), Some("Punishment"));
    assert_eq!(
        third.items,
        vec![
            item("(a)", "is guilty of an indictable offence; or"),
            item("(b)", "is guilty of an offence punishable on summary conviction."),
        ]
    );
    assert_eq!(
        section.head().unwrap().text,
        "(1) Subject to subsection (4), every person commits an offence who possesses a firearm. (3) Every person who commits an offence under subsection (1)"
    );
}

#[test]
fn subsection_definitions_select_indented_variant() {
    let document = excerpt();
    let section = find_section(&document, "s-84");
    assert_eq!(
        section.type_name(),
        "SectionWithSubsectionsWithIndentedDefinitions"
    );
    let subsections = section.subsections();
    assert_eq!(subsections.len(), 2);
    assert!(subsections[0].definition_marginal_note);
    assert_eq!(subsections[0].definitions[0].term, "ammunition");
    assert_eq!(subsections[1].marginal_note, None);
    assert_eq!(section.head().unwrap().marginal_note.as_deref(), Some("Definitions"));
}

#[test]
fn definition_marginal_note_selects_inline_variant() {
    let document = excerpt();
    let section = find_section(&document, "s-150");
    assert_eq!(section.type_name(), "SectionWithSubsectionsWithInlineDefinitions");
    let subsection = &section.subsections()[0];
    assert!(subsection.definition_marginal_note);
    assert_eq!(subsection.defined_terms, vec!["guardian"]);
    assert_eq!(subsection.label, None);
}

#[test]
fn subsection_references_are_collected_on_section() {
    let document = excerpt();
    let LegislativeNode::SectionWithExternalReference(section) = find_section(&document, "s-467.1") else {
        panic!("s-467.1 should carry external references");
    };
    assert_eq!(section.subsections.len(), 2);
    assert_eq!(
        section.external_references,
        vec![
            ExternalReference {
                text: "Controlled Drugs and Substances Act".to_string(),
                href: Some("/eng/acts/C-38.8".to_string()),
            },
            ExternalReference {
                text: "Cannabis Act".to_string(),
                href: None,
            },
        ]
    );
    assert_eq!(section.head.marginal_note.as_deref(), Some("Application"));
}

// ============================================================
// Validation & Serialization
// ============================================================

#[test]
fn excerpt_validates_cleanly() {
    let report = validate_document(&excerpt());
    assert!(report.is_clean(), "unexpected warnings: {:?}", report.warnings);
    assert_eq!(report.parts, 3);
    assert_eq!(report.sections, 11);
    assert_eq!(report.subsections, 7);
    assert_eq!(report.type_counts.get("SectionWithExternalReference"), Some(&2));
    assert_eq!(report.type_counts.len(), 11);
}

#[test]
fn serialized_nodes_carry_only_their_tag_fields() {
    let document = excerpt();
    let value = serde_json::to_value(find_section(&document, "s-180")).unwrap();
    let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(
        keys,
        vec!["items", "marginal_note", "number", "section_id", "text", "type"]
    );

    let value = serde_json::to_value(find_section(&document, "s-5")).unwrap();
    assert_eq!(value["type"], "SectionWithInlineDefinitions");
    assert!(value.get("definitions").is_none());
}

#[test]
fn pretty_json_uses_four_spaces_and_raw_unicode() {
    let json = to_pretty_json(&excerpt()).unwrap();
    assert!(json.starts_with("{\n    \"metadata\": {"));
    assert!(json.contains('\u{2014}'));
    assert!(!json.contains("\\u2014"));
}

// ============================================================
// Empty Structures
// ============================================================

#[test]
fn empty_provision_list_falls_back_to_plain_section() {
    let html = r#"<div>
<p class="Section" id="s-9"><a class="sectionLabel">9</a> Every one who</p>
<ul class="ProvisionList"></ul>
</div>"#;
    let outcome = parse_statute_html(html).unwrap();
    let node = &outcome.document.sections[0];
    assert_eq!(node.type_name(), "Section");
    assert_eq!(node.head().unwrap().text, "Every one who");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].element.as_deref(), Some("s-9"));
    assert!(validate_document(&outcome.document).is_clean());
}

#[test]
fn empty_list_before_continuation_is_not_continued_text() {
    let html = r#"<div>
<p class="Section" id="s-9"><a class="sectionLabel">9</a> Every one who</p>
<ul class="ProvisionList"></ul>
<p class="ContinuedSectionSubsection">is guilty of an offence.</p>
</div>"#;
    let outcome = parse_statute_html(html).unwrap();
    assert_eq!(outcome.document.sections[0].type_name(), "Section");
    assert_eq!(outcome.diagnostics.len(), 1);
}

#[test]
fn definition_block_of_only_orphans_falls_back_to_plain_section() {
    let html = r#"<div>
<p class="Section" id="s-10"><a class="sectionLabel">10</a> In this Act,</p>
<dl class="Definition"><dt>orphan</dt></dl>
</div>"#;
    let outcome = parse_statute_html(html).unwrap();
    let node = &outcome.document.sections[0];
    assert_eq!(node.type_name(), "Section");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].element.as_deref(), Some("s-10"));
    assert!(validate_document(&outcome.document).is_clean());
}

#[test]
fn orphan_block_with_inline_terms_keeps_inline_definitions() {
    let html = r#"<div>
<p class="Section" id="s-11"><a class="sectionLabel">11</a> In this Act, <dfn>court</dfn> means a superior court.</p>
<dl class="Definition"><dt>orphan</dt></dl>
</div>"#;
    let outcome = parse_statute_html(html).unwrap();
    let LegislativeNode::SectionWithInlineDefinitions(section) = &outcome.document.sections[0] else {
        panic!("s-11 should be an inline-definitions section");
    };
    assert_eq!(section.defined_terms, vec!["court"]);
    assert_eq!(outcome.diagnostics.len(), 1);
}
