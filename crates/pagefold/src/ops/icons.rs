// ABOUTME: Replaces icon-font markup (<i class="fa-..."> and friends) with self-contained markup.
// ABOUTME: Ships a builtin icon table embedded from data/icons.json.

use std::collections::BTreeMap;
use std::rc::Rc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::dom::render::{Edit, Plan};
use crate::dom::selectors::compile;
use crate::dom::Fragment;
use crate::error::{Result, TransformError};

/// Embedded JSON containing the builtin icon table.
const BUILTIN_ICONS_JSON: &str = include_str!("../../data/icons.json");

static BUILTIN_ICONS: Lazy<IconTable> = Lazy::new(|| {
    IconTable::from_json(BUILTIN_ICONS_JSON).expect("failed to parse builtin icon table")
});

/// Maps an icon class (e.g. `fa-check`) to its replacement markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconTable {
    icons: BTreeMap<String, String>,
}

impl IconTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table embedded in the crate.
    ///
    /// # Panics
    ///
    /// Panics on first use if the embedded JSON is malformed.
    pub fn builtin() -> &'static IconTable {
        &BUILTIN_ICONS
    }

    /// Parses a table from a JSON object of `class: markup` pairs.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            TransformError::config("icons", "cannot parse icon table", Some(e.into()))
        })
    }

    pub fn insert(&mut self, class: impl Into<String>, markup: impl Into<String>) {
        self.icons.insert(class.into(), markup.into());
    }

    pub fn get(&self, class: &str) -> Option<&str> {
        self.icons.get(class).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

/// Replaces every `<i>` or `<span>` carrying a class from `table` with that
/// class's markup. When an element carries several known classes the first
/// class in table order wins.
pub fn replace_icons(content: Option<&str>, table: &IconTable) -> Result<Option<String>> {
    const OP: &str = "replace_icons";
    let entries = table
        .icons
        .iter()
        .map(|(class, markup)| {
            let selector = compile(OP, &format!("i.{0}, span.{0}", class))?;
            let markup: Rc<str> = Rc::from(Fragment::parse(markup).inner_html()?);
            Ok((selector, markup))
        })
        .collect::<Result<Vec<_>>>()?;

    let Some(content) = content else {
        return Ok(None);
    };
    let fragment = Fragment::parse(content);
    let mut plan = Plan::new();
    for (selector, markup) in &entries {
        for el in fragment.select(selector) {
            plan.entry(el.id())
                .or_insert_with(|| Edit::Replace(markup.clone()));
        }
    }
    log::debug!("{}: {} icon(s) replaced", OP, plan.len());
    if plan.is_empty() {
        return Ok(Some(content.to_string()));
    }
    fragment.render(OP, &plan).map(Some)
}
