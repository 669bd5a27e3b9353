use serde::Deserialize;

/// Main configuration structure for Sitegauge
///
/// Every section has sensible defaults, so running without a config file
/// works out of the box.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auditor: AuditorConfig,
    pub crawl: CrawlConfig,
    pub output: OutputConfig,
}

/// Device profile emulated by the page probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceProfile {
    #[default]
    Mobile,
    Desktop,
}

impl DeviceProfile {
    /// User agent string sent while probing pages under this profile
    pub fn user_agent(&self) -> &'static str {
        match self {
            Self::Mobile => {
                "Mozilla/5.0 (Linux; Android 11; Pixel 5) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36 Sitegauge/1.0"
            }
            Self::Desktop => {
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Sitegauge/1.0"
            }
        }
    }
}

/// Page probe configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditorConfig {
    /// Device emulation profile
    pub device: DeviceProfile,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Maximum number of subresources fetched while probing one page
    #[serde(rename = "max-subresources")]
    pub max_subresources: usize,
}

impl Default for AuditorConfig {
    fn default() -> Self {
        Self {
            device: DeviceProfile::Mobile,
            timeout_secs: 30,
            max_subresources: 12,
        }
    }
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Default page budget when the caller does not pass one
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Fixed seed for estimated request timings; omit for entropy seeding
    #[serde(rename = "timing-seed")]
    pub timing_seed: Option<u64>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            timing_seed: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path for the markdown summary; no summary is written when unset
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.auditor.device, DeviceProfile::Mobile);
        assert_eq!(config.auditor.timeout_secs, 30);
        assert_eq!(config.crawl.max_pages, 10);
        assert!(config.crawl.timing_seed.is_none());
        assert!(config.output.summary_path.is_none());
    }

    #[test]
    fn test_kebab_case_fields_parse() {
        let toml_str = r#"
            [auditor]
            device = "desktop"
            timeout-secs = 10
            max-subresources = 4

            [crawl]
            max-pages = 5
            timing-seed = 7

            [output]
            summary-path = "./report.md"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.auditor.device, DeviceProfile::Desktop);
        assert_eq!(config.auditor.timeout_secs, 10);
        assert_eq!(config.auditor.max_subresources, 4);
        assert_eq!(config.crawl.max_pages, 5);
        assert_eq!(config.crawl.timing_seed, Some(7));
        assert_eq!(config.output.summary_path.as_deref(), Some("./report.md"));
    }

    #[test]
    fn test_device_profiles_have_distinct_user_agents() {
        assert_ne!(
            DeviceProfile::Mobile.user_agent(),
            DeviceProfile::Desktop.user_agent()
        );
        assert!(DeviceProfile::Mobile.user_agent().contains("Mobile"));
    }
}
