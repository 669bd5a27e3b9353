//! Configuration module for Sitegauge
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus the boundary checks (URL well-formedness, page-budget
//! clamping) applied before a crawl starts.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AuditorConfig, Config, CrawlConfig, DeviceProfile, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

// Re-export boundary validation
pub use validation::{
    clamp_max_pages, validate, validate_base_url, DEFAULT_MAX_PAGES, MAX_PAGES, MIN_PAGES,
};
