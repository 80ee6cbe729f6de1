// ABOUTME: Selector-driven primitives that apply exactly one edit to every matched element.
// ABOUTME: Retag, unwrap, wrap, class and attribute edits, swap-with-parent, remove and replace.

//! Tree primitives.
//!
//! Every primitive follows the same contract:
//! - arguments are validated first and a bad one fails with `InvalidArgument`
//!   before the content is looked at;
//! - absent content (`None`) is returned as `None`, never as an error;
//! - the selector is evaluated once against the parsed fragment and one edit
//!   is planned per match, in document order;
//! - when nothing matches the content comes back byte-for-byte unchanged.
//!
//! The content is rendered back to markup with the edits applied; the parsed
//! tree itself is never mutated.

pub mod icons;
pub mod slug;
pub mod tables;

use std::rc::Rc;

use scraper::{ElementRef, Selector};

use crate::dom::render::{self, AttrEdit, Edit, Plan, Renderer, Wrapper};
use crate::dom::selectors::compile;
use crate::dom::Fragment;
use crate::error::{Result, TransformError};

/// Marks the insertion point while rendering wrapper markup. The HTML parser
/// never produces U+0000 in text, so it cannot collide with real content.
const HOLE: char = '\u{0}';

/// Parses `content`, plans an edit for each element matched by `selector`
/// and renders the result. Content without matches is returned verbatim.
pub(crate) fn edit_matches<F>(
    op: &str,
    content: &str,
    selector: &Selector,
    mut plan_match: F,
) -> Result<String>
where
    F: for<'a> FnMut(ElementRef<'a>, &mut Plan<'a>) -> Result<()>,
{
    let fragment = Fragment::parse(content);
    let matches = fragment.select(selector);
    log::debug!("{}: {} match(es)", op, matches.len());
    if matches.is_empty() {
        return Ok(content.to_string());
    }

    let mut plan = Plan::new();
    for el in matches {
        plan_match(el, &mut plan)?;
    }
    fragment.render(op, &plan)
}

/// [`edit_matches`] lifted over absent content.
pub(crate) fn each_match<F>(
    op: &str,
    content: Option<&str>,
    selector: &Selector,
    plan_match: F,
) -> Result<Option<String>>
where
    F: for<'a> FnMut(ElementRef<'a>, &mut Plan<'a>) -> Result<()>,
{
    content
        .map(|content| edit_matches(op, content, selector, plan_match))
        .transpose()
}

/// Renames every matched element to `tag`, keeping attributes, children and position.
pub fn retag(content: Option<&str>, selector: &str, tag: &str) -> Result<Option<String>> {
    const OP: &str = "retag";
    let tag: Rc<str> = Rc::from(element_name(OP, tag)?);
    let selector = compile(OP, selector)?;
    each_match(OP, content, &selector, |el, plan| {
        plan.insert(el.id(), Edit::Retag(tag.clone()));
        Ok(())
    })
}

/// Replaces every matched element with its own children.
pub fn unwrap(content: Option<&str>, selector: &str) -> Result<Option<String>> {
    const OP: &str = "unwrap";
    let selector = compile(OP, selector)?;
    each_match(OP, content, &selector, |el, plan| {
        plan.insert(el.id(), Edit::Unwrap);
        Ok(())
    })
}

/// Wraps every matched element in the element parsed from `markup`.
///
/// The match is placed inside the deepest first element of the wrapper,
/// after anything already there. Unclosed wrapper tags are closed by the
/// parser, so `"<header>"` is a valid wrapper.
///
/// `markup` is parsed in body context. Table-context tags on their own
/// (`"<td>"`, `"<tr>"`, `"<tbody>"`) are dropped by the parser there and fail
/// with `InvalidArgument`; wrap table parts in a whole `<table>` instead.
pub fn wrap(content: Option<&str>, selector: &str, markup: &str) -> Result<Option<String>> {
    const OP: &str = "wrap";
    let wrapper = Rc::new(wrapper_parts(OP, markup)?);
    let selector = compile(OP, selector)?;
    each_match(OP, content, &selector, |el, plan| {
        plan.insert(el.id(), Edit::Wrap(wrapper.clone()));
        Ok(())
    })
}

/// Adds the whitespace-separated class tokens in `class` to every match.
///
/// An empty `class` is accepted and changes nothing.
pub fn add_class(content: Option<&str>, selector: &str, class: &str) -> Result<Option<String>> {
    const OP: &str = "add_class";
    let selector = compile(OP, selector)?;
    let tokens = class_tokens(class);
    if tokens.is_empty() {
        return Ok(content.map(str::to_string));
    }
    each_match(OP, content, &selector, |el, plan| {
        plan.insert(el.id(), Edit::Attrs(AttrEdit::AddClass(tokens.clone())));
        Ok(())
    })
}

/// Removes the class tokens in `class` from every match. A class attribute
/// left without tokens is removed entirely.
pub fn remove_class(
    content: Option<&str>,
    selector: &str,
    class: &str,
) -> Result<Option<String>> {
    const OP: &str = "remove_class";
    let selector = compile(OP, selector)?;
    let tokens = class_tokens(class);
    if tokens.is_empty() {
        return Ok(content.map(str::to_string));
    }
    each_match(OP, content, &selector, |el, plan| {
        if el.value().attr("class").is_some() {
            plan.insert(el.id(), Edit::Attrs(AttrEdit::RemoveClass(tokens.clone())));
        }
        Ok(())
    })
}

/// Deletes attribute `name` from every match that has it.
pub fn remove_attribute(
    content: Option<&str>,
    selector: &str,
    name: &str,
) -> Result<Option<String>> {
    const OP: &str = "remove_attribute";
    let name = attribute_name(OP, name)?;
    let selector = compile(OP, selector)?;
    each_match(OP, content, &selector, |el, plan| {
        plan.insert(el.id(), Edit::Attrs(AttrEdit::RemoveAttr(name.clone())));
        Ok(())
    })
}

/// Sets attribute `name` to `value` on every match, overwriting any existing value.
pub fn set_attribute(
    content: Option<&str>,
    selector: &str,
    name: &str,
    value: &str,
) -> Result<Option<String>> {
    const OP: &str = "set_attribute";
    let name = attribute_name(OP, name)?;
    let selector = compile(OP, selector)?;
    each_match(OP, content, &selector, |el, plan| {
        plan.insert(
            el.id(),
            Edit::Attrs(AttrEdit::SetAttr(name.clone(), value.to_string())),
        );
        Ok(())
    })
}

/// Exchanges every match with its parent element.
///
/// `<a href="x"><code>t</code></a>` with selector `code` becomes
/// `<code><a href="x">t</a></code>`. The parent must contain nothing but the
/// match (whitespace and comments aside), must not be the fragment root and
/// must not itself be swapped by the same call; otherwise the call fails with
/// `InvalidArgument`.
pub fn swap_tag_with_parent(content: Option<&str>, selector: &str) -> Result<Option<String>> {
    const OP: &str = "swap_tag_with_parent";
    let selector = compile(OP, selector)?;
    each_match(OP, content, &selector, |el, plan| {
        let name = el.value().name();
        if render::is_void_element(name) {
            return Err(TransformError::invalid_argument(
                OP,
                format!("cannot swap void element <{}> with its parent", name),
                None,
            ));
        }

        let parent = el
            .parent()
            .and_then(ElementRef::wrap)
            .filter(|p| p.parent().map(|gp| gp.value().is_element()).unwrap_or(false))
            .ok_or_else(|| {
                TransformError::invalid_argument(
                    OP,
                    format!("<{}> has no parent element to swap with", name),
                    None,
                )
            })?;

        let only_child = parent.children().all(|c| {
            c.id() == el.id()
                || c.value().is_comment()
                || c
                    .value()
                    .as_text()
                    .map(|t| t.trim().is_empty())
                    .unwrap_or(false)
        });
        if !only_child {
            return Err(TransformError::invalid_argument(
                OP,
                format!(
                    "parent <{}> of <{}> has other content",
                    parent.value().name(),
                    name
                ),
                None,
            ));
        }

        let parent_is_swapped = parent
            .parent()
            .and_then(|gp| plan.get(&gp.id()))
            .map(|edit| matches!(edit, Edit::LiftChild(c) if c.id() == parent.id()))
            .unwrap_or(false);
        if parent_is_swapped {
            return Err(TransformError::invalid_argument(
                OP,
                format!("<{}> and its parent are both selected", name),
                None,
            ));
        }

        plan.insert(parent.id(), Edit::LiftChild(*el));
        Ok(())
    })
}

/// Deletes every match together with its subtree.
pub fn remove(content: Option<&str>, selector: &str) -> Result<Option<String>> {
    const OP: &str = "remove";
    let selector = compile(OP, selector)?;
    each_match(OP, content, &selector, |el, plan| {
        plan.insert(el.id(), Edit::Remove);
        Ok(())
    })
}

/// Replaces every match with `markup`, normalized through the parser.
pub fn replace(content: Option<&str>, selector: &str, markup: &str) -> Result<Option<String>> {
    const OP: &str = "replace";
    let selector = compile(OP, selector)?;
    let replacement: Rc<str> = Rc::from(Fragment::parse(markup).inner_html()?);
    each_match(OP, content, &selector, |el, plan| {
        plan.insert(el.id(), Edit::Replace(replacement.clone()));
        Ok(())
    })
}

/// Validates and lowercases an element name.
pub(crate) fn element_name(op: &str, tag: &str) -> Result<String> {
    let mut chars = tag.chars();
    let valid = chars
        .next()
        .map(|c| c.is_ascii_alphabetic())
        .unwrap_or(false)
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        return Err(TransformError::invalid_argument(
            op,
            format!("invalid tag name `{}`", tag),
            None,
        ));
    }
    Ok(tag.to_ascii_lowercase())
}

/// Validates and lowercases an attribute name.
pub(crate) fn attribute_name(op: &str, name: &str) -> Result<String> {
    let valid = !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '/' | '='));
    if !valid {
        return Err(TransformError::invalid_argument(
            op,
            format!("invalid attribute name `{}`", name),
            None,
        ));
    }
    Ok(name.to_ascii_lowercase())
}

fn class_tokens(class: &str) -> Vec<String> {
    class.split_ascii_whitespace().map(str::to_string).collect()
}

/// Renders `markup`'s first element split around the point where wrapped
/// content goes: after the children of its deepest first element.
fn wrapper_parts(op: &str, markup: &str) -> Result<Wrapper> {
    let fragment = Fragment::parse(markup);
    fragment.check_depth(op)?;
    let outer = fragment.first_element().ok_or_else(|| {
        TransformError::invalid_argument(
            op,
            format!("wrapper markup `{}` contains no element", markup),
            None,
        )
    })?;

    let mut target = outer;
    while let Some(inner) = target.children().find_map(ElementRef::wrap) {
        target = inner;
    }
    let target_el = target.value();
    if render::is_void_element(target_el.name()) {
        return Err(TransformError::invalid_argument(
            op,
            format!("wrapper <{}> cannot hold content", target_el.name()),
            None,
        ));
    }

    let mut hole = String::new();
    render::open_tag(target_el, target_el.name(), None, &mut hole);
    Renderer::plain().children(*target, &mut hole);
    hole.push(HOLE);
    render::close_tag(target_el.name(), &mut hole);

    let mut plan = Plan::new();
    plan.insert(target.id(), Edit::Replace(Rc::from(hole)));
    let mut rendered = String::new();
    Renderer::new(&plan).node(*outer, &mut rendered);

    let (open, close) = rendered.split_once(HOLE).ok_or_else(|| {
        TransformError::markup(op, "wrapper insertion point was lost", None)
    })?;
    Ok(Wrapper {
        open: open.to_string(),
        close: close.to_string(),
    })
}
