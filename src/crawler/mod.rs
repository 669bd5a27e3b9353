//! Crawl module: page discovery and run orchestration
//!
//! This module contains the crawl core:
//! - Speculative discovery of candidate pages from a base URL
//! - The sequential audit loop with per-page failure capture
//! - Final aggregation and alert derivation

mod discover;
mod orchestrator;

pub use discover::discover_pages;
pub use orchestrator::{CrawlPhase, Crawler};
