// ABOUTME: JSON-configured pipelines: an ordered list of steps plus an optional final split.
// ABOUTME: Loads pipeline files, validates every step up front, then folds content through them.

//! Pipelines.
//!
//! A pipeline file names the steps to run, in order, and optionally how to
//! split the result:
//!
//! ```json
//! {
//!   "document": false,
//!   "steps": [
//!     {"op": "retag", "selector": "div.x", "tag": "code"},
//!     {"op": "remove_class", "selector": "a", "class": "ext"}
//!   ],
//!   "split": {"selector": "hr", "placement": "after", "on_start": true}
//! }
//! ```

pub mod step;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dom::selectors::compile;
use crate::dom::Fragment;
use crate::error::{Result, TransformError};
use crate::split::{Placement, Splitter};

pub use step::Step;

/// How a pipeline splits its output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitSpec {
    pub selector: Option<String>,
    #[serde(default)]
    pub placement: Placement,
    /// Start every partition with its separator and drop leading content.
    /// Overrides `placement`.
    #[serde(default)]
    pub on_start: bool,
}

impl SplitSpec {
    fn splitter(&self) -> Result<Splitter> {
        let selector = self
            .selector
            .as_deref()
            .ok_or_else(|| TransformError::missing("split", "selector"))?;
        compile("split", selector)?;
        Ok(Splitter::new(selector).placement(self.placement))
    }

    fn apply(&self, content: &str) -> Result<Vec<String>> {
        let splitter = self.splitter()?;
        if self.on_start {
            splitter.split_on_start(content)
        } else {
            splitter.split(content)
        }
    }
}

/// An ordered list of steps with an optional final split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pipeline {
    /// Input is a full document; only its `<body>` content is processed.
    #[serde(default)]
    pub document: bool,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub split: Option<SplitSpec>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Parses a pipeline from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            TransformError::config("pipeline", "cannot parse pipeline", Some(e.into()))
        })
    }

    /// Reads and parses a pipeline file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            TransformError::config(
                "pipeline",
                format!("cannot read {}", path.display()),
                Some(e.into()),
            )
        })?;
        log::debug!("pipeline: loaded {}", path.display());
        Self::from_json(&json)
    }

    /// Checks every step and the split settings without running anything.
    pub fn validate(&self) -> Result<()> {
        for step in &self.steps {
            step.validate()?;
        }
        if let Some(split) = &self.split {
            split.splitter()?;
        }
        Ok(())
    }

    /// Runs every step over `content`, ignoring any split settings.
    ///
    /// All steps are validated before the first one runs, so a bad step
    /// fails the call even when the content is absent.
    pub fn transform(&self, content: Option<&str>) -> Result<Option<String>> {
        self.validate()?;
        let Some(content) = content else {
            return Ok(None);
        };

        let mut current = if self.document {
            Fragment::parse_document(content).inner_html()?
        } else {
            content.to_string()
        };
        for step in &self.steps {
            log::trace!("pipeline: applying {}", step.name());
            if let Some(next) = step.apply(Some(&current))? {
                current = next;
            }
        }
        log::debug!("pipeline: {} step(s) applied", self.steps.len());
        Ok(Some(current))
    }

    /// Transforms `content` and splits the result. Without split settings
    /// the result is the single transformed partition.
    pub fn run(&self, content: &str) -> Result<Vec<String>> {
        let transformed = self.transform(Some(content))?.unwrap_or_default();
        match &self.split {
            Some(split) => split.apply(&transformed),
            None => Ok(vec![transformed]),
        }
    }
}
