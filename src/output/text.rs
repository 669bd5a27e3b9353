//! Terminal report printing
//!
//! Prints an aggregate report in a compact, readable layout for interactive
//! runs. Structured logging stays on tracing; this is the human-facing
//! result surface.

use crate::report::AggregateReport;

/// Prints an aggregate report to stdout
pub fn print_report(report: &AggregateReport) {
    println!("=== Sitegauge Report: {} ===\n", report.base_url);

    println!(
        "Pages analyzed: {} of {} attempted",
        report.pages_analyzed, report.pages_attempted
    );

    println!("\nCategory scores (0-100):");
    print_score("Performance", report.frontend_metrics.performance);
    print_score("Accessibility", report.frontend_metrics.accessibility);
    print_score("Best Practices", report.frontend_metrics.best_practices);
    print_score("SEO", report.frontend_metrics.seo);

    println!("\n{}", report.api_summary());

    if !report.aggregated_api_calls.is_empty() {
        println!("\nEndpoints:");
        for row in &report.aggregated_api_calls {
            println!(
                "  {} {} - {} call(s), avg {}ms, max {}ms, status {}",
                row.method,
                row.endpoint,
                row.call_count,
                row.avg_response_time,
                row.max_taken,
                row.status
            );
        }
    }

    if report.alerts.is_empty() {
        println!("\nNo alerts.");
    } else {
        println!("\nAlerts:");
        for alert in &report.alerts {
            println!(
                "  [{:?}] {:?}: {}",
                alert.severity, alert.category, alert.message
            );
            println!("    Recommendation: {}", alert.recommendation);
        }
    }

    let failed: Vec<_> = report.page_details.iter().filter(|d| !d.succeeded).collect();
    if !failed.is_empty() {
        println!("\nSkipped pages:");
        for detail in failed {
            println!(
                "  {} ({})",
                detail.url,
                detail.error.as_deref().unwrap_or("failed")
            );
        }
    }
}

fn print_score(label: &str, value: Option<u32>) {
    match value {
        Some(v) => println!("  {:<15} {}", label, v),
        None => println!("  {:<15} -", label),
    }
}
