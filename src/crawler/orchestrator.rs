//! Crawl orchestration
//!
//! Drives one end-to-end run: discover candidate pages, audit each one in
//! turn, fold results into the aggregator, then derive the final report and
//! alerts. Pages are audited strictly sequentially; one audit backend
//! session is resource-heavy, and overlapping audits would skew the very
//! timings being measured.

use crate::aggregate::CrossPageAggregator;
use crate::alerts::generate_alerts;
use crate::audit::{ApiCallExtractor, PageAuditor, TimingResolver};
use crate::config::CrawlConfig;
use crate::crawler::discover::discover_pages;
use crate::report::{AggregateReport, FrontendMetrics, PageDetail, PageReport};
use crate::{AuditResult, GaugeError};
use chrono::Utc;

/// Phase of one crawl run
///
/// Per-page audit failures do not leave the Auditing phase; Failed is
/// reserved for whole-run failure (zero pages produced a usable report).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Idle,
    Discovering,
    Auditing { index: usize, total: usize },
    Aggregating,
    Done,
    Failed,
}

/// Composes discovery, auditing, and aggregation into crawl runs
///
/// Owns its audit backend for the duration of a run; each run builds fresh
/// aggregator state, so concurrent crawlers never share anything.
pub struct Crawler<A: PageAuditor> {
    auditor: A,
    config: CrawlConfig,
}

impl<A: PageAuditor> Crawler<A> {
    /// Creates a crawler around an audit backend
    pub fn new(auditor: A, config: CrawlConfig) -> Self {
        Self { auditor, config }
    }

    /// Audits a single URL and extracts its API calls
    ///
    /// The lower-level primitive the crawl loop composes; also useful on its
    /// own for one-off page checks.
    pub async fn run_single_audit(&self, url: &str) -> AuditResult<PageReport> {
        let audit = self.auditor.audit(url).await?;

        let resolver = match self.config.timing_seed {
            Some(seed) => TimingResolver::with_seed(seed),
            None => TimingResolver::new(),
        };
        let mut extractor = ApiCallExtractor::new(resolver);
        let api_calls = extractor.extract(&audit.requests, url);

        Ok(PageReport {
            url: url.to_string(),
            scores: audit.scores,
            api_calls,
        })
    }

    /// Runs a full crawl and returns the aggregate report
    ///
    /// Per-page audit failures are recorded and skipped. The run as a whole
    /// fails only when no page at all produced a usable report.
    pub async fn run_crawl(
        &self,
        base_url: &str,
        max_pages: usize,
    ) -> Result<AggregateReport, GaugeError> {
        let mut phase = CrawlPhase::Idle;

        self.transition(&mut phase, CrawlPhase::Discovering);
        let pages = discover_pages(base_url, max_pages);
        tracing::info!("Discovered {} candidate pages for {}", pages.len(), base_url);

        let mut aggregator = CrossPageAggregator::new();
        let mut page_details = Vec::with_capacity(pages.len());

        let total = pages.len();
        for (index, url) in pages.iter().enumerate() {
            self.transition(&mut phase, CrawlPhase::Auditing { index, total });
            tracing::info!("Auditing page {}/{}: {}", index + 1, total, url);

            match self.run_single_audit(url).await {
                Ok(report) => {
                    tracing::info!(
                        "Audited {}: {} API call(s)",
                        url,
                        report.api_calls.len()
                    );
                    page_details.push(PageDetail {
                        url: url.clone(),
                        succeeded: true,
                        error: None,
                        api_call_count: report.api_calls.len(),
                    });
                    aggregator.record_page(&report);
                }
                Err(e) => {
                    tracing::warn!("Audit failed for {}: {}", url, e);
                    page_details.push(PageDetail {
                        url: url.clone(),
                        succeeded: false,
                        error: Some(e.to_string()),
                        api_call_count: 0,
                    });
                }
            }
        }

        if aggregator.pages_analyzed() == 0 {
            self.transition(&mut phase, CrawlPhase::Failed);
            return Err(GaugeError::NoPagesAnalyzed {
                base_url: base_url.to_string(),
            });
        }

        self.transition(&mut phase, CrawlPhase::Aggregating);
        let summary = aggregator.summarize();
        let alerts = generate_alerts(&summary);

        let report = AggregateReport {
            base_url: base_url.to_string(),
            generated_at: Utc::now(),
            pages_analyzed: summary.pages_analyzed,
            pages_attempted: total,
            frontend_metrics: FrontendMetrics::from_scores(&summary.average_scores),
            average_scores: summary.average_scores,
            total_api_calls: summary.total_api_calls,
            api_calls: summary.api_calls,
            aggregated_api_calls: summary.aggregated_api_calls,
            analysis: summary.analysis,
            alerts,
            page_details,
        };

        self.transition(&mut phase, CrawlPhase::Done);
        tracing::info!(
            "Crawl complete: {}/{} pages analyzed, {} API calls, {} alert(s)",
            report.pages_analyzed,
            report.pages_attempted,
            report.total_api_calls,
            report.alerts.len()
        );

        Ok(report)
    }

    fn transition(&self, phase: &mut CrawlPhase, next: CrawlPhase) {
        tracing::debug!("Crawl phase: {:?} -> {:?}", phase, next);
        *phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{PageAudit, RawRequest};
    use crate::report::CategoryScores;
    use crate::AuditError;
    use std::collections::HashMap;

    /// Scripted audit backend: maps URLs to canned audits or failures
    struct ScriptedAuditor {
        audits: HashMap<String, PageAudit>,
    }

    impl ScriptedAuditor {
        fn new() -> Self {
            Self {
                audits: HashMap::new(),
            }
        }

        fn with_page(mut self, url: &str, requests: Vec<RawRequest>) -> Self {
            self.audits.insert(
                url.to_string(),
                PageAudit {
                    scores: CategoryScores {
                        performance: Some(0.9),
                        accessibility: Some(0.8),
                        best_practices: None,
                        seo: Some(1.0),
                    },
                    requests,
                },
            );
            self
        }
    }

    impl PageAuditor for ScriptedAuditor {
        async fn audit(&self, url: &str) -> AuditResult<PageAudit> {
            self.audits.get(url).cloned().ok_or(AuditError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn xhr(url: &str, duration_ms: f64) -> RawRequest {
        RawRequest {
            url: url.to_string(),
            resource_type: Some("XHR".to_string()),
            status_code: Some(200),
            start_time: Some(0.0),
            end_time: Some(duration_ms),
            ..Default::default()
        }
    }

    fn seeded_config() -> CrawlConfig {
        CrawlConfig {
            max_pages: 10,
            timing_seed: Some(11),
        }
    }

    #[tokio::test]
    async fn test_crawl_merges_across_pages() {
        let auditor = ScriptedAuditor::new()
            .with_page(
                "https://example.com",
                vec![xhr("https://example.com/api/users", 100.0)],
            )
            .with_page(
                "https://example.com/about",
                vec![xhr("https://example.com/api/users", 300.0)],
            );
        let crawler = Crawler::new(auditor, seeded_config());

        let report = crawler.run_crawl("https://example.com", 3).await.unwrap();

        assert_eq!(report.pages_analyzed, 2);
        assert_eq!(report.pages_attempted, 3);
        assert_eq!(report.aggregated_api_calls.len(), 1);

        let row = &report.aggregated_api_calls[0];
        assert_eq!(row.call_count, 2);
        assert_eq!(row.avg_response_time, 200);
        assert_eq!(row.max_taken, 300);
    }

    #[tokio::test]
    async fn test_failed_pages_are_skipped_not_fatal() {
        let auditor = ScriptedAuditor::new().with_page("https://example.com", vec![]);
        let crawler = Crawler::new(auditor, seeded_config());

        let report = crawler.run_crawl("https://example.com", 5).await.unwrap();

        assert_eq!(report.pages_analyzed, 1);
        assert_eq!(report.pages_attempted, 5);
        let failures = report.page_details.iter().filter(|d| !d.succeeded).count();
        assert_eq!(failures, 4);
        assert!(report.page_details[0].succeeded);
    }

    #[tokio::test]
    async fn test_all_pages_failing_is_a_run_failure() {
        let crawler = Crawler::new(ScriptedAuditor::new(), seeded_config());
        let result = crawler.run_crawl("https://example.com", 10).await;
        assert!(matches!(result, Err(GaugeError::NoPagesAnalyzed { .. })));
    }

    #[tokio::test]
    async fn test_failed_page_scores_do_not_drag_averages() {
        let auditor = ScriptedAuditor::new().with_page("https://example.com", vec![]);
        let crawler = Crawler::new(auditor, seeded_config());

        let report = crawler.run_crawl("https://example.com", 4).await.unwrap();

        // only the one successful page contributes
        assert!((report.average_scores.performance.unwrap() - 0.9).abs() < 1e-9);
        assert!(report.average_scores.best_practices.is_none());
        assert_eq!(report.frontend_metrics.performance, Some(90));
    }

    #[tokio::test]
    async fn test_critical_alert_from_slow_call() {
        let auditor = ScriptedAuditor::new().with_page(
            "https://example.com",
            vec![xhr("https://example.com/api/slow", 1500.0)],
        );
        let crawler = Crawler::new(auditor, seeded_config());

        let report = crawler.run_crawl("https://example.com", 1).await.unwrap();

        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].affected, vec!["/api/slow"]);
        // the 500ms analysis bucket sees it too, independently
        assert_eq!(report.analysis.slowest_apis.len(), 1);
    }

    #[tokio::test]
    async fn test_single_audit_extracts_calls() {
        let auditor = ScriptedAuditor::new().with_page(
            "https://example.com",
            vec![
                xhr("https://example.com/api/users?page=1", 80.0),
                RawRequest {
                    url: "https://example.com/app.css".to_string(),
                    resource_type: Some("Stylesheet".to_string()),
                    ..Default::default()
                },
            ],
        );
        let crawler = Crawler::new(auditor, seeded_config());

        let page = crawler
            .run_single_audit("https://example.com")
            .await
            .unwrap();

        assert_eq!(page.api_calls.len(), 1);
        assert_eq!(page.api_calls[0].endpoint, "/api/users");
    }

    #[tokio::test]
    async fn test_api_summary_text() {
        let auditor = ScriptedAuditor::new().with_page(
            "https://example.com",
            vec![xhr("https://example.com/api/users", 600.0)],
        );
        let crawler = Crawler::new(auditor, seeded_config());
        let report = crawler.run_crawl("https://example.com", 1).await.unwrap();

        let text = report.api_summary();
        assert!(text.contains("Total API Calls: 1"));
        assert!(text.contains("Average Response Time: 600ms"));
        assert!(text.contains("Slow APIs (>500ms): 1"));
    }
}
