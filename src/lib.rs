//! Sitegauge: a website performance crawl auditor
//!
//! This crate crawls a website with a page probe, collects page-load metrics
//! and API-like network traffic, and folds the per-page observations into an
//! aggregate report with derived alerts.

pub mod aggregate;
pub mod alerts;
pub mod audit;
pub mod config;
pub mod crawler;
pub mod output;
pub mod report;

use thiserror::Error;

/// Main error type for Sitegauge operations
#[derive(Debug, Error)]
pub enum GaugeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),

    #[error("No pages analyzed for {base_url}")]
    NoPagesAnalyzed { base_url: String },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Errors raised while auditing a single page
///
/// Every variant is recoverable from the crawl's point of view: the
/// orchestrator records the failure and continues with the next page.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Invalid audit URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type alias for Sitegauge operations
pub type Result<T> = std::result::Result<T, GaugeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for single-page audit operations
pub type AuditResult<T> = std::result::Result<T, AuditError>;

// Re-export commonly used types
pub use aggregate::CrossPageAggregator;
pub use audit::{HttpProbeAuditor, PageAuditor, RawRequest};
pub use config::Config;
pub use crawler::{discover_pages, Crawler};
pub use report::{AggregateReport, ApiCall, PageReport};
