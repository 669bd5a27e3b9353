//! API call extraction from raw network requests
//!
//! Filters a page's network traffic down to API-like calls (XHR/Fetch
//! resource types or conventional API path markers) and normalizes each into
//! the canonical [`ApiCall`] shape. Requests with unparseable URLs still
//! surface as labeled fallback entries rather than vanishing from the report.

use crate::audit::{RawRequest, TimingResolver};
use crate::report::{ApiCall, ApiStatus};
use url::Url;

/// Path substrings that mark a request as application-data traffic
pub(crate) const API_PATH_MARKERS: &[&str] = &["/api/", "/graphql", "/rest/", "/v1/", "/v2/"];

/// Endpoint label used when a request URL cannot be parsed
pub const PARSE_FAILURE_ENDPOINT: &str = "Error parsing URL";

/// Extracts canonical API calls from raw page traffic
pub struct ApiCallExtractor {
    resolver: TimingResolver,
}

impl ApiCallExtractor {
    /// Creates an extractor around the given timing resolver
    pub fn new(resolver: TimingResolver) -> Self {
        Self { resolver }
    }

    /// Extracts API-like calls from a page's raw requests
    ///
    /// The result is sorted by duration, slowest first. Every qualifying
    /// request produces exactly one entry; URL parse failures produce the
    /// fallback entry with a resolver-estimated duration.
    pub fn extract(&mut self, requests: &[RawRequest], page_url: &str) -> Vec<ApiCall> {
        let mut calls: Vec<ApiCall> = requests
            .iter()
            .filter(|request| Self::is_api_like(request))
            .map(|request| self.to_api_call(request, page_url))
            .collect();

        calls.sort_by(|a, b| b.duration.cmp(&a.duration));
        calls
    }

    /// Returns true when a request looks like application-data traffic
    ///
    /// Either the backend classified it as XHR/Fetch, or its URL carries one
    /// of the conventional API path markers.
    pub fn is_api_like(request: &RawRequest) -> bool {
        if matches!(request.resource_type.as_deref(), Some("XHR") | Some("Fetch")) {
            return true;
        }
        API_PATH_MARKERS
            .iter()
            .any(|marker| request.url.contains(marker))
    }

    /// Normalizes one qualifying request into an [`ApiCall`]
    fn to_api_call(&mut self, request: &RawRequest, page_url: &str) -> ApiCall {
        let resolved = self.resolver.resolve(request);
        let method = request.method.clone().unwrap_or_else(|| "GET".to_string());
        let status = request
            .status_code
            .map(ApiStatus::Code)
            .unwrap_or(ApiStatus::Unknown);

        let endpoint = match Url::parse(&request.url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(e) => {
                tracing::warn!("Failed to parse API call URL {}: {}", request.url, e);
                PARSE_FAILURE_ENDPOINT.to_string()
            }
        };

        ApiCall {
            endpoint,
            method,
            is_error: status.is_error(),
            status,
            duration: resolved.duration,
            payload_size: format_bytes(request.transfer_size.unwrap_or(0)),
            source_page: page_url.to_string(),
            occurrence_count: 1,
            frontend_impact: None,
        }
    }
}

/// Formats a byte count as a short human-readable string
///
/// Mirrors the usual 1024-based ladder with one decimal place, trailing
/// ".0" trimmed: 0 -> "0B", 2048 -> "2KB", 1536 -> "1.5KB".
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }

    const SIZES: [&str; 4] = ["B", "KB", "MB", "GB"];
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(SIZES.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (value * 10.0).round() / 10.0;

    if rounded.fract() == 0.0 {
        format!("{}{}", rounded as u64, SIZES[exponent])
    } else {
        format!("{:.1}{}", rounded, SIZES[exponent])
    }
}
