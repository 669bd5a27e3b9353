//! Speculative page discovery
//!
//! Produces candidate URLs to audit without touching the network: the base
//! URL first, then common path guesses, then home-page variants, all under
//! the page budget. Guessed paths may not exist; the orchestrator treats a
//! failed audit of a nonexistent page as a normal per-page failure.

use url::Url;

/// Common paths most sites expose
const COMMON_PATHS: &[&str] = &["/about", "/contact", "/help", "/login"];

/// Home-page variants tried when the budget still has room
const HOME_VARIANTS: &[&str] = &["/home", "/index", "/main", "/welcome"];

/// Discovers candidate page URLs for a crawl
///
/// Guarantees: the base URL is always the first element, the list has no
/// duplicates, and its length never exceeds `max_pages`. Never fails; a
/// malformed base yields just `[base]` (base validity is the caller's
/// concern, checked at the boundary).
pub fn discover_pages(base_url: &str, max_pages: usize) -> Vec<String> {
    let mut pages = vec![base_url.to_string()];

    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Cannot expand malformed base URL {}: {}", base_url, e);
            pages.truncate(max_pages.max(1));
            return pages;
        }
    };

    append_candidates(&mut pages, &base, COMMON_PATHS, max_pages);
    append_candidates(&mut pages, &base, HOME_VARIANTS, max_pages);

    pages.truncate(max_pages.max(1));
    pages
}

/// Appends resolved path guesses under the dedup/budget rule
fn append_candidates(pages: &mut Vec<String>, base: &Url, paths: &[&str], max_pages: usize) {
    for path in paths {
        if pages.len() >= max_pages {
            break;
        }
        if let Ok(candidate) = base.join(path) {
            let candidate = candidate.to_string();
            if !pages.contains(&candidate) {
                pages.push(candidate);
            }
        }
    }
}
