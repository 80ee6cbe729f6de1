// ABOUTME: Pre-compiled CSS selector cache for repeated selector lookup.
// ABOUTME: Turns invalid selectors into InvalidArgument errors for the calling operation.

//! Selector caching for repeated DOM queries.
//!
//! Pipelines run the same handful of selectors over every page of a site, so
//! each selector string is parsed once and the compiled `Selector` is reused.
//! Invalid selectors are cached too (as `None`) so a bad pipeline fails fast
//! without re-parsing.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use scraper::Selector;

use crate::error::{Result, TransformError};

/// Thread-safe cache of compiled CSS selectors.
static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `Some(Selector)` if the selector is valid, `None` if invalid.
pub fn get_or_compile(css: &str) -> Option<Selector> {
    {
        let cache = SELECTOR_CACHE.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = Selector::parse(css).ok();
    let mut cache = SELECTOR_CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    // Another thread may have inserted while we were parsing.
    if let Some(cached) = cache.get(css) {
        return cached.clone();
    }
    cache.insert(css.to_string(), compiled.clone());
    compiled
}

/// Compiles `css` on behalf of `op`, failing with `InvalidArgument` if the
/// selector does not parse.
pub fn compile(op: &str, css: &str) -> Result<Selector> {
    if let Some(selector) = get_or_compile(css) {
        return Ok(selector);
    }
    let reason = match Selector::parse(css) {
        Err(err) => anyhow::anyhow!("{}", err),
        Ok(_) => anyhow::anyhow!("selector rejected"),
    };
    Err(TransformError::invalid_argument(
        op,
        format!("invalid selector `{}`", css),
        Some(reason),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_selector_is_cached() {
        assert!(get_or_compile("div.container").is_some());
        assert!(get_or_compile("div.container").is_some());
    }

    #[test]
    fn invalid_selector_returns_none() {
        assert!(get_or_compile("[[[invalid").is_none());
        // Invalid selectors are cached as None as well
        assert!(get_or_compile("[[[invalid").is_none());
    }

    #[test]
    fn compile_reports_invalid_argument() {
        let err = compile("unwrap", "a:not(").unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(err.op, "unwrap");
        assert!(err.detail.contains("a:not("));
    }

    #[test]
    fn empty_selector_is_invalid() {
        let err = compile("split", "").unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
