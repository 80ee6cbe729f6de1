// ABOUTME: HTML serializer that applies a per-node edit plan while writing markup.
// ABOUTME: Every primitive builds a Plan keyed by NodeId and renders through this module.

//! Plan-driven serialization.
//!
//! Operations never mutate the parsed tree. They record what should happen to
//! each matched node in a [`Plan`] and the [`Renderer`] writes the edited
//! markup in one pass. Nodes absent from the plan are written as parsed.

use std::borrow::Cow;
use std::collections::HashMap;
use std::rc::Rc;

use ego_tree::{NodeId, NodeRef};
use scraper::node::Element;
use scraper::Node;

/// Edits keyed by the node they apply to.
pub(crate) type Plan<'a> = HashMap<NodeId, Edit<'a>>;

/// A single structural edit applied to one element during rendering.
#[derive(Debug, Clone)]
pub(crate) enum Edit<'a> {
    Retag(Rc<str>),
    /// Write the children in place of the element
    Unwrap,
    Remove,
    /// Write this markup in place of the element
    Replace(Rc<str>),
    Wrap(Rc<Wrapper>),
    Attrs(AttrEdit),
    /// The given only child takes this element's place and this element
    /// becomes the child's only child.
    LiftChild(NodeRef<'a, Node>),
    /// Rows appended after the element's existing children (an existing thead)
    AppendRows(Vec<NodeRef<'a, Node>>),
    /// A new thead holding these rows is written inside the element (a table)
    InsertHead(Vec<NodeRef<'a, Node>>),
}

/// Attribute-level edit for a single element.
#[derive(Debug, Clone)]
pub(crate) enum AttrEdit {
    AddClass(Vec<String>),
    RemoveClass(Vec<String>),
    RemoveAttr(String),
    SetAttr(String, String),
}

/// Markup surrounding a wrapped element, split at the insertion point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Wrapper {
    pub open: String,
    pub close: String,
}

/// Elements whose text children are written without escaping.
const RAW_TEXT_TAGS: &[&str] = &[
    "style",
    "script",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
    "noscript",
];

/// Table children before which a created thead is inserted.
const TABLE_SECTION_TAGS: &[&str] = &["tbody", "tr", "tfoot"];

/// Writes nodes as HTML, consulting an optional edit plan.
pub(crate) struct Renderer<'p, 'a> {
    plan: Option<&'p Plan<'a>>,
}

impl Renderer<'static, 'static> {
    /// A renderer that writes every node exactly as parsed.
    pub(crate) fn plain() -> Self {
        Renderer { plan: None }
    }
}

impl<'p, 'a> Renderer<'p, 'a> {
    pub(crate) fn new(plan: &'p Plan<'a>) -> Self {
        Renderer { plan: Some(plan) }
    }

    fn edit(&self, id: NodeId) -> Option<&'p Edit<'a>> {
        self.plan.and_then(|plan| plan.get(&id))
    }

    /// Writes every child of `node`.
    pub(crate) fn children(&self, node: NodeRef<'_, Node>, out: &mut String) {
        for child in node.children() {
            self.node(child, out);
        }
    }

    /// Writes `node`, applying its planned edit if there is one.
    pub(crate) fn node(&self, node: NodeRef<'_, Node>, out: &mut String) {
        match node.value() {
            Node::Text(text) => push_text(out, text, has_raw_text_parent(node)),
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            Node::Element(el) => match self.edit(node.id()) {
                None => self.element(node, el, el.name(), None, out),
                Some(Edit::Retag(tag)) => self.element(node, el, tag, None, out),
                Some(Edit::Unwrap) => self.children(node, out),
                Some(Edit::Remove) => {}
                Some(Edit::Replace(markup)) => out.push_str(markup),
                Some(Edit::Wrap(wrapper)) => {
                    out.push_str(&wrapper.open);
                    self.element(node, el, el.name(), None, out);
                    out.push_str(&wrapper.close);
                }
                Some(Edit::Attrs(attrs)) => self.element(node, el, el.name(), Some(attrs), out),
                Some(Edit::LiftChild(child)) => self.lifted(node, el, *child, out),
                Some(Edit::AppendRows(rows)) => {
                    open_tag(el, el.name(), None, out);
                    self.children(node, out);
                    for row in rows {
                        self.moved(*row, out);
                    }
                    close_tag(el.name(), out);
                }
                Some(Edit::InsertHead(rows)) => self.with_head(node, el, rows, out),
            },
            // Doctypes and processing instructions never appear inside a content root
            _ => {}
        }
    }

    /// Writes an element under `tag`, its (planned) children, and its end tag.
    pub(crate) fn element(
        &self,
        node: NodeRef<'_, Node>,
        el: &Element,
        tag: &str,
        attrs: Option<&AttrEdit>,
        out: &mut String,
    ) {
        open_tag(el, tag, attrs, out);
        if is_void_element(tag) {
            return;
        }
        push_leading_newline(node, tag, out);
        self.children(node, out);
        close_tag(tag, out);
    }

    /// Writes a node that was relocated by the plan, ignoring the edit that
    /// removed it from its original position.
    fn moved(&self, node: NodeRef<'_, Node>, out: &mut String) {
        if let Some(el) = node.value().as_element() {
            self.element(node, el, el.name(), None, out);
        }
    }

    fn lifted(
        &self,
        parent: NodeRef<'_, Node>,
        parent_el: &Element,
        child: NodeRef<'_, Node>,
        out: &mut String,
    ) {
        let Some(child_el) = child.value().as_element() else {
            self.element(parent, parent_el, parent_el.name(), None, out);
            return;
        };
        open_tag(child_el, child_el.name(), None, out);
        open_tag(parent_el, parent_el.name(), None, out);
        for sibling in parent.children() {
            if sibling.id() == child.id() {
                self.children(child, out);
            } else {
                self.node(sibling, out);
            }
        }
        close_tag(parent_el.name(), out);
        close_tag(child_el.name(), out);
    }

    fn with_head(
        &self,
        table: NodeRef<'_, Node>,
        el: &Element,
        rows: &[NodeRef<'_, Node>],
        out: &mut String,
    ) {
        open_tag(el, el.name(), None, out);
        let mut inserted = false;
        for child in table.children() {
            let starts_section = child
                .value()
                .as_element()
                .map(|c| TABLE_SECTION_TAGS.contains(&c.name()))
                .unwrap_or(false);
            if !inserted && starts_section {
                self.head(rows, out);
                inserted = true;
            }
            self.node(child, out);
        }
        if !inserted {
            self.head(rows, out);
        }
        close_tag(el.name(), out);
    }

    fn head(&self, rows: &[NodeRef<'_, Node>], out: &mut String) {
        out.push_str("<thead>");
        for row in rows {
            self.moved(*row, out);
        }
        out.push_str("</thead>");
    }
}

/// Writes a start tag, applying an optional attribute edit.
pub(crate) fn open_tag(el: &Element, tag: &str, edit: Option<&AttrEdit>, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in edited_attrs(el, edit) {
        out.push(' ');
        out.push_str(&name);
        out.push_str("=\"");
        push_attr_value(out, &value);
        out.push('"');
    }
    out.push('>');
}

pub(crate) fn close_tag(tag: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

type Attr<'e> = (Cow<'e, str>, Cow<'e, str>);

/// Returns the element's attributes in source order with `edit` applied.
fn edited_attrs<'e>(el: &'e Element, edit: Option<&'e AttrEdit>) -> Vec<Attr<'e>> {
    let mut attrs: Vec<Attr<'e>> = el
        .attrs
        .iter()
        .map(|(name, value)| {
            // Namespaced attributes keep their prefix (`xlink:href`, `xml:lang`).
            let qualified = match &name.prefix {
                Some(prefix) => Cow::Owned(format!("{}:{}", prefix, name.local)),
                None => Cow::Borrowed(&*name.local),
            };
            (qualified, Cow::Borrowed(&**value))
        })
        .collect();

    match edit {
        None => {}
        Some(AttrEdit::AddClass(tokens)) => {
            match attrs.iter_mut().find(|(name, _)| *name == "class") {
                Some((_, value)) => {
                    let mut classes: Vec<&str> = value.split_ascii_whitespace().collect();
                    for token in tokens {
                        if !classes.contains(&token.as_str()) {
                            classes.push(token);
                        }
                    }
                    *value = Cow::Owned(classes.join(" "));
                }
                None => attrs.push((Cow::Borrowed("class"), Cow::Owned(tokens.join(" ")))),
            }
        }
        Some(AttrEdit::RemoveClass(tokens)) => {
            if let Some(pos) = attrs.iter().position(|(name, _)| *name == "class") {
                let remaining = attrs[pos]
                    .1
                    .split_ascii_whitespace()
                    .filter(|class| !tokens.iter().any(|t| t.as_str() == *class))
                    .collect::<Vec<_>>()
                    .join(" ");
                if remaining.is_empty() {
                    attrs.remove(pos);
                } else {
                    attrs[pos].1 = Cow::Owned(remaining);
                }
            }
        }
        Some(AttrEdit::RemoveAttr(target)) => {
            attrs.retain(|(name, _)| !name.eq_ignore_ascii_case(target));
        }
        Some(AttrEdit::SetAttr(target, new_value)) => {
            match attrs
                .iter_mut()
                .find(|(name, _)| name.eq_ignore_ascii_case(target))
            {
                Some((_, value)) => *value = Cow::Borrowed(new_value.as_str()),
                None => attrs.push((
                    Cow::Borrowed(target.as_str()),
                    Cow::Borrowed(new_value.as_str()),
                )),
            }
        }
    }
    attrs
}

fn has_raw_text_parent(node: NodeRef<'_, Node>) -> bool {
    node.parent()
        .and_then(|parent| parent.value().as_element().map(|el| el.name()))
        .map(|name| RAW_TEXT_TAGS.contains(&name))
        .unwrap_or(false)
}

/// The parser drops one newline directly after these start tags, so it is
/// written back when the content starts with one.
pub(crate) fn push_leading_newline(node: NodeRef<'_, Node>, tag: &str, out: &mut String) {
    if !matches!(tag, "pre" | "textarea" | "listing") {
        return;
    }
    let starts_with_newline = node
        .first_child()
        .and_then(|child| child.value().as_text().map(|text| text.starts_with('\n')))
        .unwrap_or(false);
    if starts_with_newline {
        out.push('\n');
    }
}

fn push_text(out: &mut String, text: &str, raw: bool) {
    if raw {
        out.push_str(text);
        return;
    }
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

fn push_attr_value(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

/// Check if tag is void element
pub(crate) fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "area"
            | "base"
            | "basefont"
            | "bgsound"
            | "br"
            | "col"
            | "embed"
            | "frame"
            | "hr"
            | "img"
            | "input"
            | "keygen"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}
