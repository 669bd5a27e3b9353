//! Page auditing: the probe contract and raw network records
//!
//! This module defines what the crawl core needs from an audit backend:
//! given a URL, return category scores and whatever network requests were
//! observable, timing fields included as available. The default backend is
//! [`HttpProbeAuditor`]; anything that can produce a [`PageAudit`] works.

mod extract;
mod probe;
mod timing;

pub use extract::{format_bytes, ApiCallExtractor};
pub use probe::HttpProbeAuditor;
pub use timing::{ResolvedTiming, TimingMethod, TimingResolver};

use crate::report::CategoryScores;
use crate::AuditResult;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// DevTools-style header timing pair, both fields in seconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderTiming {
    pub request_time: f64,
    pub receive_headers_end: f64,
}

/// A raw network request as observed by an audit backend
///
/// Different backends report timing under different field pairs, and any
/// subset may be absent. [`TimingResolver`] turns whatever is present into a
/// single positive duration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRequest {
    pub url: String,
    pub method: Option<String>,
    pub status_code: Option<u16>,
    pub resource_type: Option<String>,
    pub transfer_size: Option<u64>,
    pub resource_size: Option<u64>,

    /// Millisecond wall-clock pair
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,

    /// Millisecond network-layer pair
    pub network_request_time: Option<f64>,
    pub network_end_time: Option<f64>,

    /// Second-based request/response pair
    pub request_time: Option<f64>,
    pub response_received_time: Option<f64>,

    /// Millisecond started/finished pair
    pub started: Option<f64>,
    pub finished: Option<f64>,

    /// Nested header timing, seconds
    pub timing: Option<HeaderTiming>,
}

/// The normalized result of auditing one page
#[derive(Debug, Clone)]
pub struct PageAudit {
    /// Category scores, each in [0, 1] when the backend produced one
    pub scores: CategoryScores,

    /// Every network request observed while loading the page
    pub requests: Vec<RawRequest>,
}

/// An audit backend: runs one audit against a single URL
///
/// Implementations may fail per URL (navigation error, timeout, tool crash);
/// the orchestrator treats every failure as recoverable and page-local.
pub trait PageAuditor {
    fn audit(&self, url: &str) -> impl Future<Output = AuditResult<PageAudit>> + Send;
}
