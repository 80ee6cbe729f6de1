// ABOUTME: Slugification of heading ids and link fragments.
// ABOUTME: Normalizes ids to lowercase, hyphen-separated tokens so anchors match their targets.

use once_cell::sync::Lazy;
use regex::Regex;

use super::each_match;
use crate::dom::render::{AttrEdit, Edit};
use crate::dom::selectors::compile;
use crate::error::Result;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static DISALLOWED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\-]").unwrap());
static HYPHENS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").unwrap());

/// Normalizes `text` into an id-safe token.
///
/// Lowercases, turns whitespace runs into `-`, strips everything that is not
/// a word character or `-`, then collapses and trims hyphens.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let hyphenated = WHITESPACE_RE.replace_all(&lowered, "-");
    let stripped = DISALLOWED_RE.replace_all(&hyphenated, "");
    let collapsed = HYPHENS_RE.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}

/// Sets each matched element's `id` to the slug of its current id, or of
/// its text when it has none. Elements whose slug would be empty are skipped.
pub fn fix_heading_ids(content: Option<&str>, selector: &str) -> Result<Option<String>> {
    const OP: &str = "fix_heading_ids";
    let selector = compile(OP, selector)?;
    each_match(OP, content, &selector, |el, plan| {
        let source = match el.value().attr("id") {
            Some(id) => id.to_string(),
            None => el.text().collect::<String>(),
        };
        let slug = slugify(&source);
        if !slug.is_empty() && el.value().attr("id") != Some(slug.as_str()) {
            plan.insert(
                el.id(),
                Edit::Attrs(AttrEdit::SetAttr("id".to_string(), slug)),
            );
        }
        Ok(())
    })
}

/// Slugifies the `#fragment` part of each matched element's `href`.
pub fn fix_link_fragments(content: Option<&str>, selector: &str) -> Result<Option<String>> {
    const OP: &str = "fix_link_fragments";
    let selector = compile(OP, selector)?;
    each_match(OP, content, &selector, |el, plan| {
        let Some((base, fragment)) = el.value().attr("href").and_then(|h| h.split_once('#'))
        else {
            return Ok(());
        };
        let slug = slugify(fragment);
        if !fragment.is_empty() && slug != fragment {
            plan.insert(
                el.id(),
                Edit::Attrs(AttrEdit::SetAttr(
                    "href".to_string(),
                    format!("{}#{}", base, slug),
                )),
            );
        }
        Ok(())
    })
}
