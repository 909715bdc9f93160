use statute_ingest::ingest::parse_file;
use statute_ingest::runtime::logging::init_tracing;
use std::path::PathBuf;

type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

fn main() -> Result<(), DynError> {
    init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: parse_statute <input.html> <output.json> [reference.json]");
        std::process::exit(2);
    }

    let input = PathBuf::from(&args[0]);
    let output = PathBuf::from(&args[1]);
    let guide = args.get(2).map(PathBuf::from);

    let summary = parse_file(&input, &output, guide.as_deref())?;

    println!("Wrote {} ({} bytes)", summary.output.display(), summary.bytes_written);
    println!(
        "{} parts, {} sections, {} subsections",
        summary.validation.parts, summary.validation.sections, summary.validation.subsections
    );
    for (tag, count) in &summary.validation.type_counts {
        println!("  {tag}: {count}");
    }
    println!(
        "{} duplicates skipped, {} diagnostics, {} validation warnings, {} shape warnings",
        summary.duplicates_skipped,
        summary.diagnostics.len(),
        summary.validation.warnings.len(),
        summary.shape_warnings.len()
    );

    Ok(())
}
