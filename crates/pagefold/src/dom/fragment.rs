// ABOUTME: Parsed HTML content with a known content root (fragment container or document body).
// ABOUTME: Scopes selector evaluation to the content root and renders it back to markup.

use ego_tree::iter::Edge;
use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};

use super::render::{Plan, Renderer};
use super::selectors::get_or_compile;
use crate::error::{Result, TransformError};

/// Element nesting below the content root past which content is rejected
/// instead of rendered.
pub const MAX_DEPTH: usize = 512;

/// The error raised for content nested deeper than `max_depth`.
pub(crate) fn too_deep(op: &str, max_depth: usize) -> TransformError {
    TransformError::markup(
        op,
        format!("content nests deeper than {} levels", max_depth),
        None,
    )
}

/// Parsed markup plus the node whose children are "the content".
///
/// For fragment markup the root is the synthetic `<html>` container the
/// parser creates; for full documents it is `<body>`.
pub struct Fragment {
    html: Html,
    root: NodeId,
}

impl Fragment {
    /// Parses `markup` as a body-level fragment.
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_fragment(markup);
        let root = html.root_element().id();
        Self { html, root }
    }

    /// Parses `markup` as a full document whose content is the `<body>`.
    pub fn parse_document(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        let root = get_or_compile("body")
            .and_then(|body| html.select(&body).next().map(|el| el.id()))
            .unwrap_or_else(|| html.root_element().id());
        Self { html, root }
    }

    /// The content root node.
    pub fn root(&self) -> NodeRef<'_, Node> {
        self.html
            .tree
            .get(self.root)
            .unwrap_or_else(|| self.html.tree.root())
    }

    /// Elements inside the content root matching `selector`, in document order.
    ///
    /// The root itself never matches.
    pub fn select(&self, selector: &Selector) -> Vec<ElementRef<'_>> {
        match ElementRef::wrap(self.root()) {
            Some(root) => root
                .select(selector)
                .filter(|el| el.id() != self.root)
                .collect(),
            None => self.html.select(selector).collect(),
        }
    }

    /// The first element child of the content root.
    pub fn first_element(&self) -> Option<ElementRef<'_>> {
        self.root().children().find_map(ElementRef::wrap)
    }

    /// Deepest element nesting below the content root. Top-level elements
    /// are at depth 1.
    pub fn depth(&self) -> usize {
        let mut depth = 0usize;
        let mut deepest = 0usize;
        for edge in self.root().traverse() {
            match edge {
                Edge::Open(node) if node.value().is_element() => {
                    depth += 1;
                    deepest = deepest.max(depth);
                }
                Edge::Close(node) if node.value().is_element() => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
        }
        // The root itself was counted when it is an element.
        if self.root().value().is_element() {
            deepest.saturating_sub(1)
        } else {
            deepest
        }
    }

    /// Fails with a `Markup` error when the content nests deeper than
    /// [`MAX_DEPTH`]. Rendering recurses once per level.
    pub fn check_depth(&self, op: &str) -> Result<()> {
        if self.depth() > MAX_DEPTH {
            return Err(too_deep(op, MAX_DEPTH));
        }
        Ok(())
    }

    /// Markup of the content root's children.
    pub fn inner_html(&self) -> Result<String> {
        self.check_depth("render")?;
        let mut out = String::new();
        Renderer::plain().children(self.root(), &mut out);
        Ok(out)
    }

    /// Markup of the content root's children with `plan` applied.
    pub(crate) fn render(&self, op: &str, plan: &Plan<'_>) -> Result<String> {
        self.check_depth(op)?;
        let mut out = String::new();
        Renderer::new(plan).children(self.root(), &mut out);
        Ok(out)
    }
}
