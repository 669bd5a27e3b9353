//! Cross-page aggregation of audit results
//!
//! One aggregator instance exists per crawl run and owns all intermediate
//! state; nothing is shared across runs. Per-page API call observations fold
//! into an individual-call list and an aggregated-by-endpoint list, and
//! category scores accumulate into per-category means.

use crate::report::{
    AggregatedApiCall, ApiAnalysis, ApiCall, ApiStatus, CategoryScores, PageReport,
};
use std::collections::HashMap;

/// Aggregated rows with an average above this are surfaced as slow
pub const SLOW_API_THRESHOLD_MS: u64 = 500;

/// Running mean for one score category
///
/// Pages without a score for the category contribute nothing; a missing
/// score is not a zero.
#[derive(Debug, Default)]
struct ScoreAccumulator {
    sum: f64,
    count: u32,
}

impl ScoreAccumulator {
    fn add(&mut self, score: Option<f64>) {
        if let Some(value) = score {
            self.sum += value;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Everything `summarize` derives from the aggregator state
#[derive(Debug, Clone)]
pub struct AggregateSummary {
    pub pages_analyzed: usize,
    pub average_scores: CategoryScores,
    pub total_api_calls: usize,
    pub api_calls: Vec<ApiCall>,
    pub aggregated_api_calls: Vec<AggregatedApiCall>,
    pub analysis: ApiAnalysis,
}

/// Merges per-page observations across one crawl run
#[derive(Debug, Default)]
pub struct CrossPageAggregator {
    /// Individual observations; repeats of the same (method, endpoint) on
    /// the same page collapse into one entry via occurrence_count
    calls: Vec<ApiCall>,
    call_index: HashMap<(String, String, String), usize>,

    /// Aggregated rows keyed by (method, endpoint), in first-seen order
    rows: Vec<AggregatedApiCall>,
    row_index: HashMap<(String, String), usize>,

    performance: ScoreAccumulator,
    accessibility: ScoreAccumulator,
    best_practices: ScoreAccumulator,
    seo: ScoreAccumulator,

    pages_analyzed: usize,
}

impl CrossPageAggregator {
    /// Creates an empty aggregator for a new crawl run
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages folded in so far
    pub fn pages_analyzed(&self) -> usize {
        self.pages_analyzed
    }

    /// Folds one successfully audited page into the aggregate
    pub fn record_page(&mut self, page: &PageReport) {
        self.pages_analyzed += 1;

        self.performance.add(page.scores.performance);
        self.accessibility.add(page.scores.accessibility);
        self.best_practices.add(page.scores.best_practices);
        self.seo.add(page.scores.seo);

        for call in &page.api_calls {
            self.merge_call(call.clone(), &page.url);
        }
    }

    /// Merges one API call observation from the given page
    ///
    /// Updates both the individual-call list and the aggregated row for the
    /// call's (method, endpoint) key.
    pub fn merge_call(&mut self, call: ApiCall, page_url: &str) {
        self.merge_individual(&call, page_url);
        self.merge_row(&call, page_url);
    }

    fn merge_individual(&mut self, call: &ApiCall, page_url: &str) {
        let key = (
            call.method.clone(),
            call.endpoint.clone(),
            page_url.to_string(),
        );

        match self.call_index.get(&key) {
            Some(&index) => {
                let existing = &mut self.calls[index];
                existing.occurrence_count += 1;
                existing.duration = existing.duration.max(call.duration);
                if call.is_error {
                    existing.is_error = true;
                    existing.status = call.status;
                }
            }
            None => {
                let mut entry = call.clone();
                entry.source_page = page_url.to_string();
                entry.occurrence_count = 1;
                self.call_index.insert(key, self.calls.len());
                self.calls.push(entry);
            }
        }
    }

    fn merge_row(&mut self, call: &ApiCall, page_url: &str) {
        let key = (call.method.clone(), call.endpoint.clone());

        match self.row_index.get(&key) {
            Some(&index) => {
                let row = &mut self.rows[index];
                row.call_count += 1;
                row.total_time += call.duration;
                row.avg_response_time = round_div(row.total_time, row.call_count);
                row.max_taken = row.max_taken.max(call.duration);
                if call.is_error {
                    row.is_error = true;
                    row.status = call.status;
                } else if row.status == ApiStatus::Unknown {
                    row.status = call.status;
                }
                if !row.pages.iter().any(|p| p == page_url) {
                    row.pages.push(page_url.to_string());
                }
            }
            None => {
                self.row_index.insert(key, self.rows.len());
                self.rows.push(AggregatedApiCall {
                    endpoint: call.endpoint.clone(),
                    method: call.method.clone(),
                    status: call.status,
                    call_count: 1,
                    total_time: call.duration,
                    avg_response_time: call.duration,
                    max_taken: call.duration,
                    is_error: call.is_error,
                    pages: vec![page_url.to_string()],
                });
            }
        }
    }

    /// Per-category means over the pages seen so far
    pub fn average_scores(&self) -> CategoryScores {
        CategoryScores {
            performance: self.performance.mean(),
            accessibility: self.accessibility.mean(),
            best_practices: self.best_practices.mean(),
            seo: self.seo.mean(),
        }
    }

    /// Derives the aggregate summary from the current state
    ///
    /// Pure read: calling this twice without intervening merges yields
    /// identical results.
    pub fn summarize(&self) -> AggregateSummary {
        let total_duration: u64 = self.calls.iter().map(|c| c.duration).sum();
        let average_response_time = if self.calls.is_empty() {
            0
        } else {
            round_div(total_duration, self.calls.len() as u32)
        };

        let slowest_apis = self
            .rows
            .iter()
            .filter(|row| row.avg_response_time > SLOW_API_THRESHOLD_MS)
            .cloned()
            .collect();

        let error_prone_apis = self
            .rows
            .iter()
            .filter(|row| row.is_error)
            .cloned()
            .collect();

        AggregateSummary {
            pages_analyzed: self.pages_analyzed,
            average_scores: self.average_scores(),
            total_api_calls: self.calls.len(),
            api_calls: self.calls.clone(),
            aggregated_api_calls: self.rows.clone(),
            analysis: ApiAnalysis {
                average_response_time,
                slowest_apis,
                error_prone_apis,
            },
        }
    }
}

/// Integer division rounded half-up, matching `Math.round(a / b)`
fn round_div(total: u64, count: u32) -> u64 {
    let count = count as u64;
    (total + count / 2) / count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(method: &str, endpoint: &str, duration: u64, status: u16) -> ApiCall {
        let status = ApiStatus::Code(status);
        ApiCall {
            endpoint: endpoint.to_string(),
            method: method.to_string(),
            is_error: status.is_error(),
            status,
            duration,
            payload_size: "1KB".to_string(),
            source_page: String::new(),
            occurrence_count: 1,
            frontend_impact: None,
        }
    }

    fn page(url: &str, calls: Vec<ApiCall>) -> PageReport {
        PageReport {
            url: url.to_string(),
            scores: CategoryScores::default(),
            api_calls: calls,
        }
    }

    #[test]
    fn test_same_endpoint_across_pages_collapses() {
        let mut aggregator = CrossPageAggregator::new();
        aggregator.record_page(&page(
            "https://example.com",
            vec![call("GET", "/api/users", 100, 200)],
        ));
        aggregator.record_page(&page(
            "https://example.com/about",
            vec![call("GET", "/api/users", 300, 200)],
        ));

        let summary = aggregator.summarize();
        assert_eq!(summary.aggregated_api_calls.len(), 1);

        let row = &summary.aggregated_api_calls[0];
        assert_eq!(row.call_count, 2);
        assert_eq!(row.total_time, 400);
        assert_eq!(row.avg_response_time, 200);
        assert_eq!(row.max_taken, 300);
        assert_eq!(
            row.pages,
            vec!["https://example.com", "https://example.com/about"]
        );
    }

    #[test]
    fn test_methods_do_not_collapse() {
        let mut aggregator = CrossPageAggregator::new();
        aggregator.record_page(&page(
            "https://example.com",
            vec![
                call("GET", "/api/users", 100, 200),
                call("POST", "/api/users", 200, 201),
            ],
        ));
        assert_eq!(aggregator.summarize().aggregated_api_calls.len(), 2);
    }

    #[test]
    fn test_avg_never_exceeds_max_after_each_merge() {
        let mut aggregator = CrossPageAggregator::new();
        for (i, duration) in [13u64, 999, 1, 450, 77].iter().enumerate() {
            let url = format!("https://example.com/p{}", i);
            aggregator.record_page(&page(&url, vec![call("GET", "/api/data", *duration, 200)]));

            let summary = aggregator.summarize();
            let row = &summary.aggregated_api_calls[0];
            assert!(row.avg_response_time <= row.max_taken);
            assert_eq!(
                row.avg_response_time,
                round_div(row.total_time, row.call_count)
            );
        }
    }

    #[test]
    fn test_n_merges_yield_call_count_n_and_max() {
        let durations = [120u64, 80, 310, 45];
        let mut aggregator = CrossPageAggregator::new();
        for (i, duration) in durations.iter().enumerate() {
            let url = format!("https://example.com/p{}", i);
            aggregator.record_page(&page(&url, vec![call("GET", "/api/items", *duration, 200)]));
        }

        let summary = aggregator.summarize();
        let row = &summary.aggregated_api_calls[0];
        assert_eq!(row.call_count, durations.len() as u32);
        assert_eq!(row.max_taken, 310);
    }

    #[test]
    fn test_repeat_on_same_page_bumps_occurrence_count() {
        let mut aggregator = CrossPageAggregator::new();
        aggregator.record_page(&page(
            "https://example.com",
            vec![
                call("GET", "/api/cart", 50, 200),
                call("GET", "/api/cart", 90, 200),
            ],
        ));

        let summary = aggregator.summarize();
        assert_eq!(summary.api_calls.len(), 1);
        assert_eq!(summary.api_calls[0].occurrence_count, 2);
        // the aggregated row still counts every merge
        assert_eq!(summary.aggregated_api_calls[0].call_count, 2);
        // same page appears once in provenance
        assert_eq!(summary.aggregated_api_calls[0].pages.len(), 1);
    }

    #[test]
    fn test_slow_and_error_buckets() {
        let mut aggregator = CrossPageAggregator::new();
        aggregator.record_page(&page(
            "https://example.com",
            vec![
                call("GET", "/api/slow", 900, 200),
                call("GET", "/api/fast", 30, 200),
                call("GET", "/api/broken", 40, 500),
            ],
        ));

        let analysis = aggregator.summarize().analysis;
        assert_eq!(analysis.slowest_apis.len(), 1);
        assert_eq!(analysis.slowest_apis[0].endpoint, "/api/slow");
        assert_eq!(analysis.error_prone_apis.len(), 1);
        assert_eq!(analysis.error_prone_apis[0].endpoint, "/api/broken");
    }

    #[test]
    fn test_average_response_time_over_individual_calls() {
        let mut aggregator = CrossPageAggregator::new();
        aggregator.record_page(&page(
            "https://example.com",
            vec![
                call("GET", "/api/a", 100, 200),
                call("GET", "/api/b", 201, 200),
            ],
        ));
        // round(301 / 2) = 151
        assert_eq!(aggregator.summarize().analysis.average_response_time, 151);
    }

    #[test]
    fn test_empty_aggregate() {
        let summary = CrossPageAggregator::new().summarize();
        assert_eq!(summary.total_api_calls, 0);
        assert_eq!(summary.analysis.average_response_time, 0);
        assert!(summary.average_scores.performance.is_none());
    }

    #[test]
    fn test_missing_scores_are_excluded_not_zero() {
        let mut aggregator = CrossPageAggregator::new();
        let mut with_score = page("https://example.com", vec![]);
        with_score.scores.performance = Some(0.8);
        let without_score = page("https://example.com/about", vec![]);

        aggregator.record_page(&with_score);
        aggregator.record_page(&without_score);

        // mean over the single reporting page, not (0.8 + 0.0) / 2
        let scores = aggregator.average_scores();
        assert!((scores.performance.unwrap() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let mut aggregator = CrossPageAggregator::new();
        aggregator.record_page(&page(
            "https://example.com",
            vec![call("GET", "/api/users", 700, 200)],
        ));

        let first = aggregator.summarize();
        let second = aggregator.summarize();

        assert_eq!(first.total_api_calls, second.total_api_calls);
        assert_eq!(
            first.analysis.average_response_time,
            second.analysis.average_response_time
        );
        assert_eq!(
            first.aggregated_api_calls[0].call_count,
            second.aggregated_api_calls[0].call_count
        );
        assert_eq!(
            first.aggregated_api_calls[0].avg_response_time,
            second.aggregated_api_calls[0].avg_response_time
        );
    }

    #[test]
    fn test_round_div() {
        assert_eq!(round_div(301, 2), 151);
        assert_eq!(round_div(300, 2), 150);
        assert_eq!(round_div(100, 3), 33);
        assert_eq!(round_div(200, 3), 67);
    }
}
