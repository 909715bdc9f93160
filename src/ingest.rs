use crate::parser::shape::ShapeGuide;
use crate::parser::validate::{validate_document, ValidationReport};
use crate::parser::{parse_statute_html, Diagnostic};
use crate::types::StatuteDocument;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

/// What one `parse_file` run produced besides the output file.
#[derive(Debug, Clone, Serialize)]
pub struct ParseSummary {
    pub output: PathBuf,
    pub bytes_written: usize,
    pub duplicates_skipped: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub validation: ValidationReport,
    pub shape_warnings: Vec<String>,
}

// ──────────────────────────────────────────────────────────────
// Serialization
// ──────────────────────────────────────────────────────────────

/// Four-space indented JSON; non-ASCII text is written as-is.
pub fn to_pretty_json(document: &StatuteDocument) -> Result<String, String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    document
        .serialize(&mut serializer)
        .map_err(|e| format!("Failed to serialize document: {e}"))?;
    String::from_utf8(buffer).map_err(|e| format!("Serialized document is not UTF-8: {e}"))
}

pub fn load_document<P: AsRef<Path>>(path: P) -> Result<StatuteDocument, String> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse {}: {e}", path.display()))
}

/// Replaces `path` with `content` through a sibling temporary file, so the
/// destination is either the old file or the complete new one.
pub fn write_atomically(path: &Path, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| format!("Output path {} has no file name", path.display()))?;
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));

    fs::write(&temp_path, content)
        .map_err(|e| format!("Failed to write {}: {e}", temp_path.display()))?;
    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        format!("Failed to move output into {}: {e}", path.display())
    })
}

// ──────────────────────────────────────────────────────────────
// Pipeline
// ──────────────────────────────────────────────────────────────

/// Reads `input`, parses and validates it, and writes the JSON tree to
/// `output`. The tree is fully built before anything is written.
pub fn parse_file(input: &Path, output: &Path, guide: Option<&Path>) -> Result<ParseSummary, String> {
    let html = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read {}: {e}", input.display()))?;

    let outcome = parse_statute_html(&html)?;
    let validation = validate_document(&outcome.document);
    validation.log_summary();

    let shape_warnings = match guide {
        Some(guide) => {
            let warnings = match ShapeGuide::load(guide) {
                Ok(guide) => guide.check(&outcome.document),
                Err(err) => vec![format!("reference not used: {err}")],
            };
            for warning in &warnings {
                tracing::warn!("[Shape] {}", warning);
            }
            warnings
        }
        None => Vec::new(),
    };

    let json = to_pretty_json(&outcome.document)?;
    write_atomically(output, &json)?;
    tracing::info!("[Ingest] Wrote {} bytes to {}", json.len(), output.display());

    Ok(ParseSummary {
        output: output.to_path_buf(),
        bytes_written: json.len(),
        duplicates_skipped: outcome.duplicates_skipped,
        diagnostics: outcome.diagnostics,
        validation,
        shape_warnings,
    })
}
