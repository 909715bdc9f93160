use statute_ingest::parser::dom::StatuteDom;
use statute_ingest::parser::parse_statute_html;
use std::time::Instant;

fn main() {
    let path = std::env::args()
        .nth(1)
        .expect("Usage: bench_parser <html_file>");
    let html = std::fs::read_to_string(&path).expect("Failed to read HTML file");

    let iterations = 5;

    // Baseline: tokenize and index the DOM only
    let _ = StatuteDom::parse(&html);
    let mut baseline_durations = Vec::new();
    for i in 0..iterations {
        let start = Instant::now();
        let dom = StatuteDom::parse(&html).expect("Failed to tokenize HTML");
        let elapsed = start.elapsed();
        baseline_durations.push(elapsed);
        println!(
            "Baseline {}: {:.3}s ({} elements)",
            i + 1,
            elapsed.as_secs_f64(),
            dom.elements().len(),
        );
    }
    let baseline_avg =
        baseline_durations.iter().map(|d| d.as_secs_f64()).sum::<f64>() / iterations as f64;
    let baseline_min = baseline_durations
        .iter()
        .map(|d| d.as_secs_f64())
        .fold(f64::INFINITY, f64::min);
    println!("Baseline avg: {:.3}s, min: {:.3}s\n", baseline_avg, baseline_min);

    // Parser benchmark
    let _ = parse_statute_html(&html);
    let mut durations = Vec::new();
    for i in 0..iterations {
        let start = Instant::now();
        let outcome = parse_statute_html(&html).expect("Failed to parse HTML");
        let elapsed = start.elapsed();
        durations.push(elapsed);
        println!(
            "Iteration {}: {:.3}s ({} nodes, {} duplicates skipped)",
            i + 1,
            elapsed.as_secs_f64(),
            outcome.document.sections.len(),
            outcome.duplicates_skipped,
        );
    }

    let avg = durations.iter().map(|d| d.as_secs_f64()).sum::<f64>() / iterations as f64;
    let min = durations.iter().map(|d| d.as_secs_f64()).fold(f64::INFINITY, f64::min);
    println!("\nParser avg: {:.3}s, min: {:.3}s", avg, min);
    println!("Overhead vs baseline: {:.1}x", avg / baseline_avg);
}
