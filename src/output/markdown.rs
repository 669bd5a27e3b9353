//! Markdown summary generation
//!
//! Renders an aggregate report as a human-readable markdown document with
//! score, endpoint, analysis, and alert sections.

use crate::output::OutputResult;
use crate::report::AggregateReport;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary file from an aggregate report
///
/// # Arguments
///
/// * `report` - The aggregate report to render
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(report: &AggregateReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats an aggregate report as markdown
pub fn format_markdown_summary(report: &AggregateReport) -> String {
    let mut md = String::new();

    md.push_str("# Sitegauge Performance Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Site**: {}\n", report.base_url));
    md.push_str(&format!("- **Generated**: {}\n", report.generated_at));
    md.push_str(&format!(
        "- **Pages Analyzed**: {} of {} attempted\n\n",
        report.pages_analyzed, report.pages_attempted
    ));

    md.push_str("## Category Scores\n\n");
    md.push_str("| Category | Score |\n");
    md.push_str("|----------|-------|\n");
    let metrics = &report.frontend_metrics;
    md.push_str(&format!(
        "| Performance | {} |\n",
        format_metric(metrics.performance)
    ));
    md.push_str(&format!(
        "| Accessibility | {} |\n",
        format_metric(metrics.accessibility)
    ));
    md.push_str(&format!(
        "| Best Practices | {} |\n",
        format_metric(metrics.best_practices)
    ));
    md.push_str(&format!("| SEO | {} |\n\n", format_metric(metrics.seo)));

    md.push_str("## API Endpoints\n\n");
    if report.aggregated_api_calls.is_empty() {
        md.push_str("No API calls detected.\n\n");
    } else {
        md.push_str("| Endpoint | Method | Calls | Avg (ms) | Max (ms) | Status |\n");
        md.push_str("|----------|--------|-------|----------|----------|--------|\n");
        for row in &report.aggregated_api_calls {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                row.endpoint,
                row.method,
                row.call_count,
                row.avg_response_time,
                row.max_taken,
                row.status
            ));
        }
        md.push('\n');
    }

    md.push_str("## Analysis\n\n");
    md.push_str(&format!(
        "- **Total API Calls**: {}\n",
        report.total_api_calls
    ));
    md.push_str(&format!(
        "- **Average Response Time**: {}ms\n",
        report.analysis.average_response_time
    ));
    md.push_str(&format!(
        "- **Slow APIs (>500ms)**: {}\n",
        report.analysis.slowest_apis.len()
    ));
    md.push_str(&format!(
        "- **Error-prone APIs**: {}\n\n",
        report.analysis.error_prone_apis.len()
    ));

    md.push_str("## Alerts\n\n");
    if report.alerts.is_empty() {
        md.push_str("No alerts.\n\n");
    } else {
        for alert in &report.alerts {
            md.push_str(&format!(
                "- **{:?}** ({:?}): {}\n  - Recommendation: {}\n",
                alert.severity, alert.category, alert.message, alert.recommendation
            ));
        }
        md.push('\n');
    }

    if !report.page_details.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| Page | Result | API Calls |\n");
        md.push_str("|------|--------|-----------|\n");
        for detail in &report.page_details {
            let result = if detail.succeeded {
                "audited".to_string()
            } else {
                detail.error.clone().unwrap_or_else(|| "failed".to_string())
            };
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                detail.url, result, detail.api_call_count
            ));
        }
        md.push('\n');
    }

    md
}

/// Formats a 0-100 metric or a dash when the category produced no score
fn format_metric(value: Option<u32>) -> String {
    match value {
        Some(v) => format!("{}/100", v),
        None => "-".to_string(),
    }
}
