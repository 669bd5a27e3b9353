//! Report data model
//!
//! This module defines the canonical shapes produced by a crawl:
//! per-page audit reports, merged API call observations, and the final
//! aggregate report handed back to the caller.

use crate::alerts::{Alert, ImpactLevel};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// HTTP status of an observed API call
///
/// Raw network records do not always carry a status code, so "Unknown" is a
/// first-class value rather than a missing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    Code(u16),
    Unknown,
}

impl ApiStatus {
    /// Returns the numeric status code, if one was observed
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Code(code) => Some(*code),
            Self::Unknown => None,
        }
    }

    /// Returns true if the status is a 4xx or 5xx code
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Code(code) if *code >= 400)
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{}", code),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

impl Serialize for ApiStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Code(code) => serializer.serialize_u16(*code),
            Self::Unknown => serializer.serialize_str("Unknown"),
        }
    }
}

/// A single API call observed on one page, in canonical form
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCall {
    /// URL path of the endpoint, query string stripped
    pub endpoint: String,

    /// HTTP method, "GET" when the raw record carried none
    pub method: String,

    /// Observed HTTP status
    pub status: ApiStatus,

    /// Resolved duration in milliseconds, always >= 1
    pub duration: u64,

    /// Human-readable transfer size (e.g. "1.5KB")
    pub payload_size: String,

    /// True when status is 4xx/5xx
    pub is_error: bool,

    /// The page URL this call was observed on
    pub source_page: String,

    /// How many times this call was observed on its source page
    pub occurrence_count: u32,

    /// Frontend-rendering impact classification, when a correlation pass
    /// measured one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontend_impact: Option<ImpactLevel>,
}

/// Repeat observations of one logical endpoint, merged across pages
///
/// The grouping key is (method, endpoint). Invariant: `avg_response_time`
/// equals `round(total_time / call_count)` and never exceeds `max_taken`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedApiCall {
    pub endpoint: String,
    pub method: String,

    /// First observed status; error codes win over Unknown
    pub status: ApiStatus,

    /// Number of merged observations
    pub call_count: u32,

    /// Sum of all observed durations in milliseconds
    pub total_time: u64,

    /// round(total_time / call_count)
    pub avg_response_time: u64,

    /// Largest single observed duration
    pub max_taken: u64,

    /// True when any merged observation had status >= 400
    pub is_error: bool,

    /// Source pages in discovery order, deduplicated
    pub pages: Vec<String>,
}

/// Derived analysis over the merged API call set
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAnalysis {
    /// round(mean duration over individual calls), 0 when no calls
    pub average_response_time: u64,

    /// Aggregated rows with avg_response_time > 500ms
    pub slowest_apis: Vec<AggregatedApiCall>,

    /// Aggregated rows that saw a 4xx/5xx status
    pub error_prone_apis: Vec<AggregatedApiCall>,
}

/// Category scores for one audited dimension set, each in [0, 1]
///
/// A missing score means the auditor could not produce that category for the
/// page; it is excluded from averages rather than treated as zero.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub performance: Option<f64>,
    pub accessibility: Option<f64>,
    pub best_practices: Option<f64>,
    pub seo: Option<f64>,
}

/// Category scores scaled to rounded 0-100 integers for display
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendMetrics {
    pub performance: Option<u32>,
    pub accessibility: Option<u32>,
    pub best_practices: Option<u32>,
    pub seo: Option<u32>,
}

impl FrontendMetrics {
    /// Scales [0, 1] category scores to 0-100 percentages
    pub fn from_scores(scores: &CategoryScores) -> Self {
        let percent = |score: Option<f64>| score.map(|s| (s * 100.0).round() as u32);
        Self {
            performance: percent(scores.performance),
            accessibility: percent(scores.accessibility),
            best_practices: percent(scores.best_practices),
            seo: percent(scores.seo),
        }
    }
}

/// Audit results for a single page
///
/// Created per audited page and folded into the aggregate; only a thin
/// per-page breakdown survives in the final report.
#[derive(Debug, Clone)]
pub struct PageReport {
    pub url: String,
    pub scores: CategoryScores,
    pub api_calls: Vec<ApiCall>,
}

/// Outcome of one attempted page audit, kept for the per-page breakdown
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDetail {
    pub url: String,
    pub succeeded: bool,

    /// Failure reason for pages that could not be audited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub api_call_count: usize,
}

/// The final report for one crawl run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub base_url: String,
    pub generated_at: DateTime<Utc>,

    /// Pages that produced a usable audit (may be fewer than attempted)
    pub pages_analyzed: usize,

    /// Pages the discoverer proposed and the orchestrator attempted
    pub pages_attempted: usize,

    /// Per-category mean over pages that reported that category
    pub average_scores: CategoryScores,

    /// 0-100 display form of the average scores
    pub frontend_metrics: FrontendMetrics,

    pub total_api_calls: usize,
    pub api_calls: Vec<ApiCall>,
    pub aggregated_api_calls: Vec<AggregatedApiCall>,
    pub analysis: ApiAnalysis,
    pub alerts: Vec<Alert>,
    pub page_details: Vec<PageDetail>,
}

impl AggregateReport {
    /// Plain-text API summary, suitable for terminal or log output
    pub fn api_summary(&self) -> String {
        format!(
            "API Analysis across {} pages:\n\nTotal API Calls: {}\nAverage Response Time: {}ms\nSlow APIs (>500ms): {}\nError-prone APIs: {}",
            self.pages_analyzed,
            self.total_api_calls,
            self.analysis.average_response_time,
            self.analysis.slowest_apis.len(),
            self.analysis.error_prone_apis.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_threshold() {
        assert!(!ApiStatus::Code(399).is_error());
        assert!(ApiStatus::Code(400).is_error());
        assert!(ApiStatus::Code(503).is_error());
        assert!(!ApiStatus::Unknown.is_error());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ApiStatus::Code(200).to_string(), "200");
        assert_eq!(ApiStatus::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_status_serializes_as_number_or_string() {
        assert_eq!(serde_json::to_string(&ApiStatus::Code(200)).unwrap(), "200");
        assert_eq!(
            serde_json::to_string(&ApiStatus::Unknown).unwrap(),
            "\"Unknown\""
        );
    }

    #[test]
    fn test_frontend_metrics_rounding() {
        let scores = CategoryScores {
            performance: Some(0.856),
            accessibility: Some(1.0),
            best_practices: None,
            seo: Some(0.004),
        };
        let metrics = FrontendMetrics::from_scores(&scores);
        assert_eq!(metrics.performance, Some(86));
        assert_eq!(metrics.accessibility, Some(100));
        assert_eq!(metrics.best_practices, None);
        assert_eq!(metrics.seo, Some(0));
    }
}
