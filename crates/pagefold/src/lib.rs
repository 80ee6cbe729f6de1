// ABOUTME: Main library entry point for pagefold, a post-processor for generated HTML.
// ABOUTME: Re-exports the public API: primitives, the splitter, Pipeline, Step, TransformError, ErrorCode.

//! pagefold - selector-driven post-processing of generated HTML.
//!
//! Every operation takes content as a markup string plus a CSS selector and
//! returns new markup. Primitives apply one small edit to each matched
//! element; the splitter cuts content into partitions at separator elements;
//! a [`Pipeline`] chains both from a JSON description.
//!
//! # Example
//!
//! ```
//! use pagefold::{ops, split};
//!
//! let html = ops::retag(Some("<div class=\"x\">a</div>"), "div.x", "code")
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(html, "<code class=\"x\">a</code>");
//!
//! let parts = split::split("<p>A</p><hr><p>B</p>", "hr").unwrap();
//! assert_eq!(parts, vec!["<p>A</p>", "<p>B</p>"]);
//! ```

pub mod dom;
pub mod error;
pub mod ops;
pub mod pipeline;
pub mod split;

pub use crate::error::{ErrorCode, Result, TransformError};
pub use crate::ops::icons::{replace_icons, IconTable};
pub use crate::ops::slug::{fix_heading_ids, fix_link_fragments, slugify};
pub use crate::ops::tables::move_rows_to_head;
pub use crate::pipeline::{Pipeline, SplitSpec, Step};
pub use crate::split::{split, split_on_start, split_with, Placement, Splitter};
