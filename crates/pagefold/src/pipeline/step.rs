// ABOUTME: Serde-tagged pipeline step that dispatches to one primitive or helper.
// ABOUTME: Every field is optional in JSON; missing required fields surface as InvalidArgument.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};
use crate::ops::{self, icons, icons::IconTable, slug, tables};

/// Headings whose ids `fix_heading_ids` rewrites when no selector is given.
const DEFAULT_HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";

/// Links whose fragments `fix_link_fragments` rewrites when no selector is given.
const DEFAULT_LINK_SELECTOR: &str = "a[href*=\"#\"]";

/// One configured transformation, applied to the whole content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Rename every match to `tag`
    Retag {
        selector: Option<String>,
        tag: Option<String>,
    },
    /// Replace every match by its children
    Unwrap { selector: Option<String> },
    /// Enclose every match in a copy of `markup`
    Wrap {
        selector: Option<String>,
        markup: Option<String>,
    },
    AddClass {
        selector: Option<String>,
        class: Option<String>,
    },
    RemoveClass {
        selector: Option<String>,
        class: Option<String>,
    },
    RemoveAttribute {
        selector: Option<String>,
        name: Option<String>,
    },
    SetAttribute {
        selector: Option<String>,
        name: Option<String>,
        value: Option<String>,
    },
    /// Exchange every match with its parent element
    #[serde(alias = "swap_with_parent")]
    SwapTagWithParent { selector: Option<String> },
    Remove { selector: Option<String> },
    Replace {
        selector: Option<String>,
        markup: Option<String>,
    },
    FixHeadingIds { selector: Option<String> },
    FixLinkFragments { selector: Option<String> },
    MoveRowsToHead { selector: Option<String> },
    /// Replace icon-font markup, using the builtin table unless `icons` is given
    ReplaceIcons { icons: Option<IconTable> },
}

impl Step {
    /// The operation name as written in pipeline JSON.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Retag { .. } => "retag",
            Step::Unwrap { .. } => "unwrap",
            Step::Wrap { .. } => "wrap",
            Step::AddClass { .. } => "add_class",
            Step::RemoveClass { .. } => "remove_class",
            Step::RemoveAttribute { .. } => "remove_attribute",
            Step::SetAttribute { .. } => "set_attribute",
            Step::SwapTagWithParent { .. } => "swap_tag_with_parent",
            Step::Remove { .. } => "remove",
            Step::Replace { .. } => "replace",
            Step::FixHeadingIds { .. } => "fix_heading_ids",
            Step::FixLinkFragments { .. } => "fix_link_fragments",
            Step::MoveRowsToHead { .. } => "move_rows_to_head",
            Step::ReplaceIcons { .. } => "replace_icons",
        }
    }

    /// Checks every argument without touching any content.
    pub fn validate(&self) -> Result<()> {
        self.apply(None).map(|_| ())
    }

    /// Runs the step over `content`. Absent content stays absent.
    pub fn apply(&self, content: Option<&str>) -> Result<Option<String>> {
        let op = self.name();
        match self {
            Step::Retag { selector, tag } => {
                ops::retag(content, require(op, "selector", selector)?, require(op, "tag", tag)?)
            }
            Step::Unwrap { selector } => ops::unwrap(content, require(op, "selector", selector)?),
            Step::Wrap { selector, markup } => ops::wrap(
                content,
                require(op, "selector", selector)?,
                require(op, "markup", markup)?,
            ),
            Step::AddClass { selector, class } => ops::add_class(
                content,
                require(op, "selector", selector)?,
                require(op, "class", class)?,
            ),
            Step::RemoveClass { selector, class } => ops::remove_class(
                content,
                require(op, "selector", selector)?,
                require(op, "class", class)?,
            ),
            Step::RemoveAttribute { selector, name } => ops::remove_attribute(
                content,
                require(op, "selector", selector)?,
                require(op, "name", name)?,
            ),
            Step::SetAttribute {
                selector,
                name,
                value,
            } => ops::set_attribute(
                content,
                require(op, "selector", selector)?,
                require(op, "name", name)?,
                require(op, "value", value)?,
            ),
            Step::SwapTagWithParent { selector } => {
                ops::swap_tag_with_parent(content, require(op, "selector", selector)?)
            }
            Step::Remove { selector } => ops::remove(content, require(op, "selector", selector)?),
            Step::Replace { selector, markup } => ops::replace(
                content,
                require(op, "selector", selector)?,
                require(op, "markup", markup)?,
            ),
            Step::FixHeadingIds { selector } => slug::fix_heading_ids(
                content,
                selector.as_deref().unwrap_or(DEFAULT_HEADING_SELECTOR),
            ),
            Step::FixLinkFragments { selector } => slug::fix_link_fragments(
                content,
                selector.as_deref().unwrap_or(DEFAULT_LINK_SELECTOR),
            ),
            Step::MoveRowsToHead { selector } => {
                tables::move_rows_to_head(content, require(op, "selector", selector)?)
            }
            Step::ReplaceIcons { icons: table } => icons::replace_icons(
                content,
                table.as_ref().unwrap_or_else(|| IconTable::builtin()),
            ),
        }
    }
}

fn require<'s>(op: &str, name: &str, value: &'s Option<String>) -> Result<&'s str> {
    value
        .as_deref()
        .ok_or_else(|| TransformError::missing(op, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn step(json: &str) -> Step {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn deserializes_tagged_steps() {
        assert_eq!(
            step(r#"{"op": "retag", "selector": "b", "tag": "strong"}"#),
            Step::Retag {
                selector: Some("b".into()),
                tag: Some("strong".into()),
            }
        );
        assert_eq!(
            step(r#"{"op": "swap_with_parent", "selector": "code"}"#).name(),
            "swap_tag_with_parent"
        );
    }

    #[test]
    fn missing_field_is_invalid_argument() {
        let err = step(r#"{"op": "set_attribute", "selector": "a", "name": "rel"}"#)
            .validate()
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(err.op, "set_attribute");
        assert!(err.detail.contains("`value`"));
    }

    #[test]
    fn bad_argument_fails_validation() {
        let err = step(r#"{"op": "retag", "selector": "b", "tag": "<x>"}"#)
            .validate()
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn applies_primitive() {
        let out = step(r#"{"op": "add_class", "selector": "p", "class": "lead"}"#)
            .apply(Some("<p>x</p>"))
            .unwrap();
        assert_eq!(out.as_deref(), Some(r#"<p class="lead">x</p>"#));
    }

    #[test]
    fn heading_ids_default_selector() {
        let out = step(r#"{"op": "fix_heading_ids"}"#)
            .apply(Some("<h2>Read Me</h2>"))
            .unwrap();
        assert_eq!(out.as_deref(), Some(r#"<h2 id="read-me">Read Me</h2>"#));
    }

    #[test]
    fn inline_icon_table() {
        let out = step(r#"{"op": "replace_icons", "icons": {"fa-star": "<b>*</b>"}}"#)
            .apply(Some(r#"<i class="fa fa-star"></i>"#))
            .unwrap();
        assert_eq!(out.as_deref(), Some("<b>*</b>"));
    }

    #[test]
    fn unknown_op_does_not_deserialize() {
        assert!(serde_json::from_str::<Step>(r#"{"op": "explode"}"#).is_err());
    }
}
