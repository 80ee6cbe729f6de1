// ABOUTME: Splits HTML content into ordered partitions around separator elements.
// ABOUTME: Recurses into nested separators, trimming ancestors down to their pre-separator content.

//! Content splitting.
//!
//! A [`Splitter`] evaluates its selector once to find the *separators*, then
//! walks the content root's children in document order, starting a new
//! partition at every separator. When a separator sits inside some other
//! element, that element stays in the earlier partition with only the
//! content that precedes the separator, and everything after the separator
//! continues as flat, top-level partitions.
//!
//! ```
//! use pagefold::split::split;
//!
//! let parts = split("<hr><p>A</p><hr><p>B</p>", "hr").unwrap();
//! assert_eq!(parts, vec!["", "<p>A</p>", "<p>B</p>"]);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use ego_tree::{NodeId, NodeRef};
use scraper::Node;
use serde::{Deserialize, Serialize};

use crate::dom::fragment::{too_deep, MAX_DEPTH};
use crate::dom::render::{self, Renderer};
use crate::dom::selectors::compile;
use crate::dom::Fragment;
use crate::error::Result;

/// Nesting depth past which content is rejected rather than walked.
pub const DEFAULT_MAX_DEPTH: usize = MAX_DEPTH;

/// Where a separator element ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Last item of the partition before the boundary.
    Before,
    /// First item of the partition after the boundary.
    After,
    /// Dropped.
    #[default]
    #[serde(rename = "none")]
    Omit,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Placement::Before => "before",
            Placement::After => "after",
            Placement::Omit => "none",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "before" => Ok(Placement::Before),
            "after" => Ok(Placement::After),
            "none" | "omit" => Ok(Placement::Omit),
            other => Err(format!(
                "unknown placement `{}` (expected before, after or none)",
                other
            )),
        }
    }
}

/// Splits content at elements matching a selector.
#[derive(Debug, Clone)]
pub struct Splitter {
    selector: String,
    placement: Placement,
    max_depth: usize,
}

impl Splitter {
    /// A splitter dropping separators, with the default depth limit.
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            placement: Placement::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set where separators are placed.
    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the maximum element nesting the walk will descend into.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Splits fragment markup.
    pub fn split(&self, content: &str) -> Result<Vec<String>> {
        self.split_parsed(content, |c| Fragment::parse(c))
    }

    /// Splits the `<body>` content of a full document.
    pub fn split_document(&self, content: &str) -> Result<Vec<String>> {
        self.split_parsed(content, |c| Fragment::parse_document(c))
    }

    /// Splits so that every partition starts with its separator, forcing
    /// [`Placement::After`]. Content before the first separator is dropped.
    pub fn split_on_start(&self, content: &str) -> Result<Vec<String>> {
        let mut partitions = self.clone().placement(Placement::After).split(content)?;
        if partitions.len() > 1 {
            partitions.remove(0);
        }
        Ok(partitions)
    }

    fn split_parsed(&self, content: &str, parse: impl Fn(&str) -> Fragment) -> Result<Vec<String>> {
        let selector = compile("split", &self.selector)?;
        let fragment = parse(content);
        let separators: HashSet<NodeId> = fragment
            .select(&selector)
            .iter()
            .map(|el| el.id())
            .collect();
        log::debug!(
            "split: {} separator(s) for `{}`, placement {}",
            separators.len(),
            self.selector,
            self.placement
        );
        if separators.is_empty() {
            return Ok(vec![content.to_string()]);
        }
        fragment.check_depth("split")?;

        let walk = Walk {
            separators: &separators,
            placement: self.placement,
            max_depth: self.max_depth,
        };
        let partitions = walk.partition(fragment.root(), 0)?;
        Ok(partitions.iter().map(|p| render_partition(p)).collect())
    }
}

/// Splits `content` at `selector`, dropping the separators.
pub fn split(content: &str, selector: &str) -> Result<Vec<String>> {
    Splitter::new(selector).split(content)
}

/// Splits `content` at `selector`, placing separators per `placement`.
pub fn split_with(content: &str, selector: &str, placement: Placement) -> Result<Vec<String>> {
    Splitter::new(selector).placement(placement).split(content)
}

/// Splits `content` so that every partition starts with its separator.
///
/// Content before the first separator belongs to no group and is discarded.
/// Without any separator the content is returned unchanged as the only
/// partition.
pub fn split_on_start(content: &str, selector: &str) -> Result<Vec<String>> {
    Splitter::new(selector).split_on_start(content)
}

/// One item of a partition.
#[derive(Debug)]
enum Piece<'a> {
    /// An original node written as parsed.
    Whole(NodeRef<'a, Node>),
    /// An original element written with only these children, because a
    /// separator inside it moved the rest into later partitions.
    Trimmed {
        node: NodeRef<'a, Node>,
        children: Vec<Piece<'a>>,
    },
}

type Partition<'a> = Vec<Piece<'a>>;

struct Walk<'s> {
    separators: &'s HashSet<NodeId>,
    placement: Placement,
    max_depth: usize,
}

impl Walk<'_> {
    /// Partitions the children of `node`. Always returns at least one
    /// partition; more than one means a separator was found below `node`.
    fn partition<'a>(&self, node: NodeRef<'a, Node>, depth: usize) -> Result<Vec<Partition<'a>>> {
        if depth > self.max_depth {
            return Err(too_deep("split", self.max_depth));
        }

        let mut partitions: Vec<Partition<'a>> = vec![Vec::new()];
        for child in node.children() {
            if self.separators.contains(&child.id()) {
                match self.placement {
                    Placement::Before => {
                        current(&mut partitions).push(Piece::Whole(child));
                        partitions.push(Vec::new());
                    }
                    Placement::After => partitions.push(vec![Piece::Whole(child)]),
                    Placement::Omit => partitions.push(Vec::new()),
                }
                continue;
            }

            if child.value().is_element() && child.has_children() {
                let mut nested = self.partition(child, depth + 1)?.into_iter();
                if nested.len() > 1 {
                    let head = nested.next().unwrap_or_default();
                    current(&mut partitions).push(Piece::Trimmed {
                        node: child,
                        children: head,
                    });
                    partitions.extend(nested);
                    continue;
                }
            }

            current(&mut partitions).push(Piece::Whole(child));
        }
        Ok(partitions)
    }
}

/// The partition new content is appended to: always the last one.
fn current<'v, 'a>(partitions: &'v mut Vec<Partition<'a>>) -> &'v mut Partition<'a> {
    if partitions.is_empty() {
        partitions.push(Vec::new());
    }
    let last = partitions.len() - 1;
    &mut partitions[last]
}

fn render_partition(partition: &[Piece<'_>]) -> String {
    let mut out = String::new();
    render_pieces(partition, &mut out);
    out.trim().to_string()
}

fn render_pieces(pieces: &[Piece<'_>], out: &mut String) {
    let renderer = Renderer::plain();
    for piece in pieces {
        match piece {
            Piece::Whole(node) => renderer.node(*node, out),
            Piece::Trimmed { node, children } => {
                if let Some(el) = node.value().as_element() {
                    render::open_tag(el, el.name(), None, out);
                    render::push_leading_newline(*node, el.name(), out);
                    render_pieces(children, out);
                    render::close_tag(el.name(), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn top_level_separators_omitted() {
        let parts = split("<body><hr><p>A</p><hr><p>B</p></body>", "hr").unwrap();
        assert_eq!(parts, vec!["", "<p>A</p>", "<p>B</p>"]);
    }

    #[test]
    fn no_match_returns_input_verbatim() {
        let html = "<p>A</p>\n   <p  class=x>B</p>";
        assert_eq!(split(html, "hr").unwrap(), vec![html.to_string()]);
    }

    #[test]
    fn trailing_separator_gives_empty_partition() {
        let parts = split("<p>A</p><hr>", "hr").unwrap();
        assert_eq!(parts, vec!["<p>A</p>", ""]);
    }

    #[test]
    fn nested_separator_trims_ancestor() {
        let html = "<div class=\"c\"><p>a</p><hr><p>b</p></div><p>c</p>";
        let parts = split(html, "hr").unwrap();
        assert_eq!(parts, vec!["<div class=\"c\"><p>a</p></div>", "<p>b</p><p>c</p>"]);
    }

    #[test]
    fn trimmed_pre_keeps_leading_newline() {
        let parts = split("<pre>\n\ncode<hr>more</pre>", "hr").unwrap();
        assert_eq!(parts, vec!["<pre>\n\ncode</pre>", "more"]);
    }

    #[test]
    fn deeply_nested_separator() {
        let html = "<section><div><p>a</p><hr><p>b</p></div><p>c</p></section><p>d</p>";
        let parts = split(html, "hr").unwrap();
        assert_eq!(
            parts,
            vec![
                "<section><div><p>a</p></div></section>",
                "<p>b</p><p>c</p><p>d</p>"
            ]
        );
    }

    #[test]
    fn after_placement_starts_partitions() {
        let parts = Splitter::new("h2")
            .placement(Placement::After)
            .split("<p>intro</p><h2>One</h2><p>1</p><h2>Two</h2><p>2</p>")
            .unwrap();
        assert_eq!(
            parts,
            vec!["<p>intro</p>", "<h2>One</h2><p>1</p>", "<h2>Two</h2><p>2</p>"]
        );
    }

    #[test]
    fn before_placement_ends_partitions() {
        let parts = Splitter::new("hr")
            .placement(Placement::Before)
            .split("<hr><p>A</p><hr>")
            .unwrap();
        assert_eq!(parts, vec!["<hr>", "<p>A</p><hr>", ""]);
    }

    #[test]
    fn split_on_start_drops_leading_content() {
        let parts = split_on_start("<p>intro</p><h2>One</h2><p>1</p><h2>Two</h2>", "h2").unwrap();
        assert_eq!(parts, vec!["<h2>One</h2><p>1</p>", "<h2>Two</h2>"]);
    }

    #[test]
    fn split_on_start_without_separator_returns_input() {
        let parts = split_on_start("<p>only</p>", "h2").unwrap();
        assert_eq!(parts, vec!["<p>only</p>"]);
    }

    #[test]
    fn separators_are_matched_by_identity() {
        // Both paragraphs are equal by value but only the marked one separates.
        let parts = split("<p>x</p><p class=\"cut\">x</p><p>x</p>", "p.cut").unwrap();
        assert_eq!(parts, vec!["<p>x</p>", "<p>x</p>"]);
    }

    #[test]
    fn depth_limit_is_enforced() {
        let html = "<div><div><div><hr></div></div></div>";
        let err = Splitter::new("hr").max_depth(1).split(html).unwrap_err();
        assert!(err.is_markup());
    }

    #[test]
    fn deep_content_beside_separator_is_a_markup_error() {
        let depth = MAX_DEPTH + 10;
        let html = format!("{}{}<hr>", "<div>".repeat(depth), "</div>".repeat(depth));
        let err = split(&html, "hr").unwrap_err();
        assert!(err.is_markup());
        assert_eq!(err.op, "split");
    }

    #[test]
    fn invalid_selector_is_invalid_argument() {
        let err = split("<p>x</p>", "p[").unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn placement_parses() {
        assert_eq!("after".parse::<Placement>().unwrap(), Placement::After);
        assert_eq!("NONE".parse::<Placement>().unwrap(), Placement::Omit);
        assert!("sideways".parse::<Placement>().is_err());
    }
}
