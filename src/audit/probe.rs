//! HTTP-based page probe auditor
//!
//! The default [`PageAuditor`] backend. It navigates a page with a plain
//! HTTP client, parses the document, fetches a bounded number of
//! subresources to measure their timings, and derives heuristic category
//! scores from what it saw. API references embedded in the page source are
//! probed as Fetch-type requests so API-like traffic shows up even without
//! a scripted browser behind the audit.

use crate::audit::extract::API_PATH_MARKERS;
use crate::audit::{PageAudit, PageAuditor, RawRequest};
use crate::config::AuditorConfig;
use crate::report::CategoryScores;
use crate::{AuditError, AuditResult};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use url::Url;

/// A subresource selected for probing
#[derive(Debug, Clone)]
struct ProbeResource {
    url: String,
    kind: &'static str,
}

/// What the document parser learned about one page
#[derive(Debug, Default)]
struct DocumentSummary {
    resources: Vec<ProbeResource>,
    has_title: bool,
    has_meta_description: bool,
    img_total: usize,
    img_with_alt: usize,
    mixed_content: bool,
}

/// HTTP page probe implementing [`PageAuditor`]
pub struct HttpProbeAuditor {
    client: Client,
    config: AuditorConfig,
}

impl HttpProbeAuditor {
    /// Builds a probe with its own HTTP client
    ///
    /// The client emulates the configured device profile through its user
    /// agent and applies the configured per-request timeout.
    pub fn new(config: AuditorConfig) -> AuditResult<Self> {
        let client = Client::builder()
            .user_agent(config.device.user_agent())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetches one subresource and records its observed timing
    ///
    /// Failures still produce a record: the request happened, we just could
    /// not complete it, so status stays unknown and the elapsed time stands.
    async fn fetch_resource(&self, resource: &ProbeResource) -> RawRequest {
        let started = Instant::now();
        let (status_code, transfer_size) = match self.client.get(&resource.url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let size = match response.bytes().await {
                    Ok(bytes) => Some(bytes.len() as u64),
                    Err(_) => None,
                };
                (Some(status), size)
            }
            Err(e) => {
                tracing::debug!("Subresource fetch failed for {}: {}", resource.url, e);
                (None, None)
            }
        };
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        RawRequest {
            url: resource.url.clone(),
            method: Some("GET".to_string()),
            status_code,
            resource_type: Some(resource.kind.to_string()),
            transfer_size,
            start_time: Some(0.0),
            end_time: Some(elapsed_ms),
            ..Default::default()
        }
    }
}

impl PageAuditor for HttpProbeAuditor {
    async fn audit(&self, url: &str) -> AuditResult<PageAudit> {
        let base = Url::parse(url).map_err(|e| AuditError::InvalidUrl {
            url: url.to_string(),
            source: e,
        })?;

        tracing::debug!("Probing page: {}", url);

        let started = Instant::now();
        let response = self
            .client
            .get(base.clone())
            .send()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(url, e))?;
        let document_ms = started.elapsed().as_secs_f64() * 1000.0;

        // scraper's Html is !Send, so parsing stays inside a sync helper
        // and never crosses an await point.
        let summary = summarize_document(&body, &base);

        let mut requests = vec![RawRequest {
            url: url.to_string(),
            method: Some("GET".to_string()),
            status_code: Some(status.as_u16()),
            resource_type: Some("Document".to_string()),
            transfer_size: Some(body.len() as u64),
            start_time: Some(0.0),
            end_time: Some(document_ms),
            ..Default::default()
        }];

        let mut total_ms = document_ms;
        for resource in summary.resources.iter().take(self.config.max_subresources) {
            let request = self.fetch_resource(resource).await;
            if let (Some(start), Some(end)) = (request.start_time, request.end_time) {
                total_ms += end - start;
            }
            requests.push(request);
        }

        let scores = score_page(&summary, &base, total_ms);

        tracing::debug!(
            "Probe complete for {}: {} requests, {:.0}ms total",
            url,
            requests.len(),
            total_ms
        );

        Ok(PageAudit { scores, requests })
    }
}

/// Maps a transport-level failure to the audit error taxonomy
fn classify_transport_error(url: &str, e: reqwest::Error) -> AuditError {
    if e.is_timeout() {
        AuditError::Timeout {
            url: url.to_string(),
        }
    } else {
        AuditError::Http {
            url: url.to_string(),
            source: e,
        }
    }
}

/// Parses the document and collects everything the probe needs from it
fn summarize_document(html: &str, base: &Url) -> DocumentSummary {
    let document = Html::parse_document(html);
    let mut summary = DocumentSummary::default();
    let mut seen: HashSet<String> = HashSet::new();

    let mut push_resource = |summary: &mut DocumentSummary, href: &str, kind: &'static str| {
        if let Ok(resolved) = base.join(href) {
            let resolved = resolved.to_string();
            if seen.insert(resolved.clone()) {
                summary.resources.push(ProbeResource {
                    url: resolved,
                    kind,
                });
            }
        }
    };

    if let Ok(selector) = Selector::parse("script[src]") {
        for element in document.select(&selector) {
            if let Some(src) = element.value().attr("src") {
                push_resource(&mut summary, src, "Script");
            }
        }
    }

    if let Ok(selector) = Selector::parse(r#"link[rel="stylesheet"][href]"#) {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                push_resource(&mut summary, href, "Stylesheet");
            }
        }
    }

    if let Ok(selector) = Selector::parse("img") {
        for element in document.select(&selector) {
            summary.img_total += 1;
            if element
                .value()
                .attr("alt")
                .map(|alt| !alt.trim().is_empty())
                .unwrap_or(false)
            {
                summary.img_with_alt += 1;
            }
            if let Some(src) = element.value().attr("src") {
                push_resource(&mut summary, src, "Image");
            }
        }
    }

    // API endpoints referenced from page source are probed as Fetch
    // requests, standing in for the XHR traffic a browser would issue.
    for reference in scan_api_references(html, base) {
        if seen.insert(reference.clone()) {
            summary.resources.push(ProbeResource {
                url: reference,
                kind: "Fetch",
            });
        }
    }

    if let Ok(selector) = Selector::parse("title") {
        summary.has_title = document
            .select(&selector)
            .next()
            .map(|t| !t.text().collect::<String>().trim().is_empty())
            .unwrap_or(false);
    }

    if let Ok(selector) = Selector::parse(r#"meta[name="description"]"#) {
        summary.has_meta_description = document
            .select(&selector)
            .next()
            .and_then(|m| m.value().attr("content"))
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false);
    }

    summary.mixed_content = base.scheme() == "https" && html.contains("http://");

    summary
}

/// Scans page source for quoted URLs carrying API path markers
fn scan_api_references(html: &str, base: &Url) -> Vec<String> {
    let mut found = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for marker in API_PATH_MARKERS {
        for (start, _) in html.match_indices(marker) {
            let head = &html[..start];
            let Some(quote_pos) = head.rfind(|c| c == '"' || c == '\'') else {
                continue;
            };
            let quote = head[quote_pos..].chars().next().unwrap_or('"');
            let candidate_area = &html[quote_pos + 1..];
            let Some(end) = candidate_area.find(quote) else {
                continue;
            };
            let candidate = &candidate_area[..end];

            if !candidate.contains(marker)
                || candidate.len() > 2048
                || candidate.contains(char::is_whitespace)
            {
                continue;
            }

            if let Ok(resolved) = base.join(candidate) {
                let resolved = resolved.to_string();
                if seen.insert(resolved.clone()) {
                    found.push(resolved);
                }
            }
        }
    }

    found
}

/// Derives heuristic category scores from document checks and load time
fn score_page(summary: &DocumentSummary, base: &Url, total_ms: f64) -> CategoryScores {
    // Full marks under one second, linear falloff to zero at ten seconds.
    let performance = if total_ms <= 1000.0 {
        1.0
    } else {
        ((10_000.0 - total_ms) / 9_000.0).clamp(0.0, 1.0)
    };

    let alt_ratio = if summary.img_total == 0 {
        1.0
    } else {
        summary.img_with_alt as f64 / summary.img_total as f64
    };
    let accessibility = (alt_ratio - if summary.has_title { 0.0 } else { 0.1 }).clamp(0.0, 1.0);

    let mut best_practices: f64 = 1.0;
    if base.scheme() != "https" {
        best_practices -= 0.3;
    }
    if summary.mixed_content {
        best_practices -= 0.2;
    }

    let mut seo: f64 = 1.0;
    if !summary.has_title {
        seo -= 0.4;
    }
    if !summary.has_meta_description {
        seo -= 0.3;
    }

    CategoryScores {
        performance: Some(performance),
        accessibility: Some(accessibility),
        best_practices: Some(best_practices.clamp(0.0, 1.0)),
        seo: Some(seo.clamp(0.0, 1.0)),
    }
}
