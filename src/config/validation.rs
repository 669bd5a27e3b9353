use crate::config::types::{AuditorConfig, Config, CrawlConfig};
use crate::ConfigError;
use url::Url;

/// Smallest accepted page budget
pub const MIN_PAGES: usize = 1;

/// Largest accepted page budget; speculative audits beyond this are wasteful
pub const MAX_PAGES: usize = 20;

/// Page budget used when the caller does not request one
pub const DEFAULT_MAX_PAGES: usize = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_auditor_config(&config.auditor)?;
    validate_crawl_config(&config.crawl)?;
    Ok(())
}

/// Validates probe configuration
fn validate_auditor_config(config: &AuditorConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    if config.max_subresources < 1 {
        return Err(ConfigError::Validation(format!(
            "max-subresources must be >= 1, got {}",
            config.max_subresources
        )));
    }

    Ok(())
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_pages < MIN_PAGES || config.max_pages > MAX_PAGES {
        return Err(ConfigError::Validation(format!(
            "max-pages must be between {} and {}, got {}",
            MIN_PAGES, MAX_PAGES, config.max_pages
        )));
    }

    Ok(())
}

/// Clamps a requested page budget into the accepted range
///
/// `None` falls back to the default budget. This runs at the thin boundary
/// before the core is invoked, so the core can assume a sane budget.
pub fn clamp_max_pages(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_MAX_PAGES)
        .clamp(MIN_PAGES, MAX_PAGES)
}

/// Validates that a base URL is well-formed and probeable
///
/// Accepts http/https URLs with a host. Anything else is rejected here at
/// the boundary; downstream discovery assumes its base has been vetted.
pub fn validate_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}
