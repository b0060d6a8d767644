//! Update modes: whether to generate, and how to splice the result in.

use std::fmt;
use std::str::FromStr;

use crate::error::DescbotError;
use crate::marker::{self, MarkerPair};

/// How generated text is merged into an existing description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Only write when the description is blank.
    Empty,
    /// Add a new generated block under a `---` rule.
    Append,
    /// Throw the old description away.
    Replace,
    /// Swap the previous generated block in place, keep everything else.
    Smart,
}

impl UpdateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::Empty => "empty",
            UpdateMode::Append => "append",
            UpdateMode::Replace => "replace",
            UpdateMode::Smart => "smart",
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateMode {
    type Err = DescbotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty" => Ok(UpdateMode::Empty),
            "append" => Ok(UpdateMode::Append),
            "replace" => Ok(UpdateMode::Replace),
            "smart" => Ok(UpdateMode::Smart),
            other => Err(DescbotError::config(format!(
                "unknown update mode {other:?} (expected empty, append, replace or smart)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationDecision {
    pub generate: bool,
    pub reason: &'static str,
}

pub fn should_generate(current: &str, mode: UpdateMode) -> GenerationDecision {
    let (generate, reason) = match mode {
        UpdateMode::Empty if current.trim().is_empty() => (true, "description is empty"),
        UpdateMode::Empty => (false, "description already has content"),
        UpdateMode::Append => (true, "append mode always generates"),
        UpdateMode::Replace => (true, "replace mode always generates"),
        UpdateMode::Smart => (true, "smart mode always generates"),
    };
    GenerationDecision { generate, reason }
}

/// Build the new description from the current one and fresh generated text.
///
/// Marker strings in `generated` are removed so the block always ends at its
/// own end marker. In `smart` mode, stray markers in an existing description
/// without a valid pair are removed too; otherwise a lone start marker would
/// pair with the new end marker on the next run and swallow the text between.
///
/// `Empty` does not look at `existing`; callers only get here after
/// [`should_generate`] said yes.
pub fn apply_update_mode(
    existing: &str,
    generated: &str,
    mode: UpdateMode,
    markers: &MarkerPair,
) -> String {
    let generated = marker::strip_markers(generated, markers);
    let wrapped = marker::wrap(generated.trim(), markers);
    let existing_trimmed = existing.trim();

    match mode {
        UpdateMode::Empty | UpdateMode::Replace => wrapped,
        UpdateMode::Append if existing_trimmed.is_empty() => wrapped,
        UpdateMode::Append => format!("{existing_trimmed}\n\n---\n\n{wrapped}"),
        UpdateMode::Smart if marker::has_generated_content(existing, markers) => {
            let sections = marker::parse(existing, markers);
            [sections.before, wrapped.as_str(), sections.after]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n")
        }
        UpdateMode::Smart => {
            let user_text = marker::strip_markers(existing, markers);
            let user_text = user_text.trim();
            if user_text.is_empty() {
                wrapped
            } else {
                format!("{user_text}\n\n{wrapped}")
            }
        }
    }
}
