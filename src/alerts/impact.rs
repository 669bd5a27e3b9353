//! Frontend-rendering impact classification
//!
//! Part of the optional correlation step: given how much the page's render
//! time moved around an API call, bucket the call's frontend impact. The
//! alert engine's frontend_impact rule keys off the High bucket, so the
//! thresholds here are load-bearing.

use serde::Serialize;

/// Three-bucket classification of an API call's rendering impact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

impl ImpactLevel {
    /// Classifies a render-time delta measured before/after an API call
    ///
    /// Over 100ms is High, over 50ms is Medium, anything else is Low.
    pub fn from_render_delta(delta_ms: f64) -> Self {
        if delta_ms > 100.0 {
            Self::High
        } else if delta_ms > 50.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}
