use crate::sweep::SweepOutcome;

/// Render a sweep outcome as a text report for humans; the JSON result stays
/// the machine contract.
pub fn generate_sweep_report(outcome: &SweepOutcome) -> String {
    let total_pages: usize = outcome.results.iter().map(|r| r.pages_crawled.len()).sum();
    let total_links: usize = outcome
        .results
        .iter()
        .map(|r| r.interesting_links_found.len())
        .sum();
    let total_errors: usize = outcome.results.iter().map(|r| r.errors.len()).sum();

    let mut report = String::new();
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Sources crawled: {}\n", outcome.sources_crawled));
    report.push_str(&format!("  Pages crawled: {}\n", total_pages));
    report.push_str(&format!("  Interesting links: {}\n", total_links));
    report.push_str(&format!("  Errors: {}\n", total_errors));
    report.push('\n');

    for result in &outcome.results {
        let heading = result
            .source_label
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(&result.source_url);
        report.push_str(&format!("## {}\n", heading));

        for page in &result.pages_crawled {
            report.push_str(&format!("  {} - {}\n", page.title, page.url));
        }
        for failure in &result.errors {
            report.push_str(&format!("  ! {} - {}\n", failure.url, failure.error));
        }
        report.push('\n');
    }

    report
}
