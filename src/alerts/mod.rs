//! Alert derivation over aggregated crawl metrics
//!
//! Every rule is evaluated independently against the aggregate; one input
//! can trigger several rules. Critical alerts are emitted before warnings,
//! and within a severity the rule evaluation order is stable.

mod impact;

pub use impact::ImpactLevel;

use crate::aggregate::AggregateSummary;
use crate::report::ApiCall;
use serde::Serialize;

/// Individual calls above this duration trigger the critical latency alert
///
/// Deliberately distinct from the 500ms bucket used for the slowest-APIs
/// analysis list; the two thresholds coexist in the rule set.
pub const CRITICAL_LATENCY_MS: u64 = 1000;

/// Alert severity, critical first in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
}

/// What part of the system an alert is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    ApiPerformance,
    FrontendImpact,
}

/// A derived, human-readable finding
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(rename = "type")]
    pub severity: AlertSeverity,
    pub category: AlertCategory,
    pub message: String,

    /// Endpoints or URLs the finding applies to
    pub affected: Vec<String>,

    pub recommendation: String,
}

/// Derives the alert list for one aggregate summary
///
/// Rules, in emission order:
/// - critical api_performance: any individual call slower than 1000ms
/// - warning frontend_impact: any call classified with High rendering impact
pub fn generate_alerts(summary: &AggregateSummary) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if let Some(alert) = critical_latency_rule(&summary.api_calls) {
        alerts.push(alert);
    }

    if let Some(alert) = frontend_impact_rule(&summary.api_calls) {
        alerts.push(alert);
    }

    alerts
}

/// Critical rule: individual calls exceeding [`CRITICAL_LATENCY_MS`]
fn critical_latency_rule(calls: &[ApiCall]) -> Option<Alert> {
    let slow: Vec<&ApiCall> = calls
        .iter()
        .filter(|call| call.duration > CRITICAL_LATENCY_MS)
        .collect();

    if slow.is_empty() {
        return None;
    }

    let affected = dedup_endpoints(&slow);
    Some(Alert {
        severity: AlertSeverity::Critical,
        category: AlertCategory::ApiPerformance,
        message: format!(
            "{} API call(s) took longer than {}ms: {}",
            slow.len(),
            CRITICAL_LATENCY_MS,
            affected.join(", ")
        ),
        affected,
        recommendation: "Optimize slow endpoints or add caching".to_string(),
    })
}

/// Warning rule: calls whose rendering impact was classified High
fn frontend_impact_rule(calls: &[ApiCall]) -> Option<Alert> {
    let heavy: Vec<&ApiCall> = calls
        .iter()
        .filter(|call| call.frontend_impact == Some(ImpactLevel::High))
        .collect();

    if heavy.is_empty() {
        return None;
    }

    let affected = dedup_endpoints(&heavy);
    Some(Alert {
        severity: AlertSeverity::Warning,
        category: AlertCategory::FrontendImpact,
        message: format!(
            "{} API call(s) with high frontend-rendering impact: {}",
            heavy.len(),
            affected.join(", ")
        ),
        affected,
        recommendation: "Defer heavy API calls or batch DOM updates after responses".to_string(),
    })
}

/// Collects affected endpoints in first-seen order without duplicates
fn dedup_endpoints(calls: &[&ApiCall]) -> Vec<String> {
    let mut endpoints: Vec<String> = Vec::new();
    for call in calls {
        if !endpoints.iter().any(|e| e == &call.endpoint) {
            endpoints.push(call.endpoint.clone());
        }
    }
    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ApiAnalysis, ApiStatus, CategoryScores};

    fn call(endpoint: &str, duration: u64) -> ApiCall {
        ApiCall {
            endpoint: endpoint.to_string(),
            method: "GET".to_string(),
            status: ApiStatus::Code(200),
            duration,
            payload_size: "1KB".to_string(),
            is_error: false,
            source_page: "https://example.com".to_string(),
            occurrence_count: 1,
            frontend_impact: None,
        }
    }

    fn summary_with_calls(calls: Vec<ApiCall>) -> AggregateSummary {
        AggregateSummary {
            pages_analyzed: 1,
            average_scores: CategoryScores::default(),
            total_api_calls: calls.len(),
            api_calls: calls,
            aggregated_api_calls: vec![],
            analysis: ApiAnalysis {
                average_response_time: 0,
                slowest_apis: vec![],
                error_prone_apis: vec![],
            },
        }
    }

    #[test]
    fn test_no_alerts_below_thresholds() {
        let summary = summary_with_calls(vec![call("/api/a", 400), call("/api/b", 999)]);
        assert!(generate_alerts(&summary).is_empty());
    }

    #[test]
    fn test_call_over_1000ms_is_critical() {
        let summary = summary_with_calls(vec![call("/api/slow", 1500)]);
        let alerts = generate_alerts(&summary);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[0].category, AlertCategory::ApiPerformance);
        assert_eq!(alerts[0].affected, vec!["/api/slow"]);
        assert!(alerts[0].message.contains("1 API call"));
    }

    #[test]
    fn test_slow_average_alone_does_not_trigger() {
        // rules inspect individual calls; a slow aggregated average with no
        // single call over the critical threshold stays in the analysis
        // buckets only
        let mut summary = summary_with_calls(vec![call("/api/page", 800), call("/api/page", 900)]);
        summary.aggregated_api_calls = vec![crate::report::AggregatedApiCall {
            endpoint: "/api/page".to_string(),
            method: "GET".to_string(),
            status: ApiStatus::Code(200),
            call_count: 2,
            total_time: 1700,
            avg_response_time: 850,
            max_taken: 900,
            is_error: false,
            pages: vec!["https://example.com".to_string()],
        }];

        assert!(generate_alerts(&summary).is_empty());
    }

    #[test]
    fn test_exactly_1000ms_does_not_trigger() {
        let summary = summary_with_calls(vec![call("/api/edge", 1000)]);
        assert!(generate_alerts(&summary).is_empty());
    }

    #[test]
    fn test_high_impact_triggers_warning() {
        let mut heavy = call("/api/render", 80);
        heavy.frontend_impact = Some(ImpactLevel::High);
        let mut mild = call("/api/quiet", 80);
        mild.frontend_impact = Some(ImpactLevel::Medium);

        let alerts = generate_alerts(&summary_with_calls(vec![heavy, mild]));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);
        assert_eq!(alerts[0].category, AlertCategory::FrontendImpact);
        assert_eq!(alerts[0].affected, vec!["/api/render"]);
    }

    #[test]
    fn test_critical_ordered_before_warning() {
        let mut heavy = call("/api/render", 1200);
        heavy.frontend_impact = Some(ImpactLevel::High);

        let alerts = generate_alerts(&summary_with_calls(vec![heavy]));
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[1].severity, AlertSeverity::Warning);
    }

    #[test]
    fn test_affected_endpoints_deduplicate() {
        let mut a = call("/api/slow", 1100);
        a.source_page = "https://example.com".to_string();
        let mut b = call("/api/slow", 1300);
        b.source_page = "https://example.com/about".to_string();

        let alerts = generate_alerts(&summary_with_calls(vec![a, b]));
        assert_eq!(alerts[0].affected, vec!["/api/slow"]);
        assert!(alerts[0].message.contains("2 API call"));
    }

    #[test]
    fn test_alert_serialization_shape() {
        let summary = summary_with_calls(vec![call("/api/slow", 2000)]);
        let json = serde_json::to_value(&generate_alerts(&summary)[0]).unwrap();
        assert_eq!(json["type"], "critical");
        assert_eq!(json["category"], "api_performance");
        assert!(json["recommendation"].as_str().unwrap().contains("caching"));
    }
}
