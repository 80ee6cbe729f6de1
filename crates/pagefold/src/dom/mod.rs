// ABOUTME: DOM parsing, selector and serialization helpers built on scraper's tree.
// ABOUTME: Provides Fragment, the compiled-selector cache and the plan-driven renderer.

//! DOM utilities for HTML fragment manipulation.
//!
//! This module wraps scraper's parsed tree with a content root, caches
//! compiled selectors and serializes trees with per-node edits applied.

pub mod fragment;
pub(crate) mod render;
pub mod selectors;

pub use fragment::Fragment;
