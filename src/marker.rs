//! Start/end markers that fence the generated block inside a PR body.
//!
//! The only memory descbot has of earlier runs is this fence: the body is
//! re-fetched every time and the generated block is found again by scanning
//! for the markers. Anything that does not form a clean start-then-end pair
//! is left alone and treated as user text.

use crate::error::DescbotError;

pub const DEFAULT_MARKER: &str = "<!-- gemini-pr-description -->";

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";
const END_SUFFIX: &str = "-end";

/// The start and end marker derived from one configured base marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPair {
    start: String,
    end: String,
}

impl MarkerPair {
    /// Derive the pair from a base of the form `<!-- name -->`.
    ///
    /// The end marker is the base with `-end` inserted right after the name,
    /// so `<!-- gemini-pr-description -->` pairs with
    /// `<!-- gemini-pr-description-end -->`.
    pub fn from_base(base: &str) -> Result<Self, DescbotError> {
        let base = base.trim();

        let inner = base
            .strip_prefix(COMMENT_OPEN)
            .and_then(|rest| rest.strip_suffix(COMMENT_CLOSE))
            .ok_or_else(|| {
                DescbotError::config(format!(
                    "generation marker {base:?} must look like `<!-- name -->`"
                ))
            })?;

        let name = inner.trim();
        if name.is_empty() {
            return Err(DescbotError::config(format!(
                "generation marker {base:?} has an empty name"
            )));
        }
        if name.contains(COMMENT_OPEN) || name.contains(COMMENT_CLOSE) {
            return Err(DescbotError::config(format!(
                "generation marker {base:?} contains a nested comment delimiter"
            )));
        }

        // Keep whatever whitespace the user put before `-->`.
        let trailing_ws = &inner[inner.trim_end().len()..];
        let head = &base[..base.len() - COMMENT_CLOSE.len() - trailing_ws.len()];
        let end = format!("{head}{END_SUFFIX}{trailing_ws}{COMMENT_CLOSE}");

        if end == base || end.contains(base) || base.contains(end.as_str()) {
            return Err(DescbotError::config(format!(
                "generation marker {base:?} produces an ambiguous end marker {end:?}"
            )));
        }

        Ok(MarkerPair {
            start: base.to_string(),
            end,
        })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

/// The three regions of a description document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections<'a> {
    pub before: &'a str,
    pub generated: &'a str,
    pub after: &'a str,
}

impl<'a> Sections<'a> {
    fn degenerate(doc: &'a str) -> Self {
        Sections {
            before: doc,
            generated: "",
            after: "",
        }
    }
}

/// Where the marker scan ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    NoStart,
    StartOnly { start: usize },
    /// `start` is the offset of the start marker, `end` of the end marker.
    Complete { start: usize, end: usize },
}

fn scan(doc: &str, markers: &MarkerPair) -> Scan {
    let mut state = Scan::NoStart;
    loop {
        state = match state {
            Scan::NoStart => match doc.find(markers.start()) {
                Some(start) => Scan::StartOnly { start },
                None => return Scan::NoStart,
            },
            Scan::StartOnly { start } => {
                let content_from = start + markers.start().len();
                match doc[content_from..].find(markers.end()) {
                    Some(rel) => Scan::Complete {
                        start,
                        end: content_from + rel,
                    },
                    None => return state,
                }
            }
            Scan::Complete { .. } => return state,
        };
    }
}

/// True when `doc` holds a start marker followed by an end marker.
pub fn has_generated_content(doc: &str, markers: &MarkerPair) -> bool {
    matches!(scan(doc, markers), Scan::Complete { .. })
}

/// Split `doc` around its generated block.
///
/// Without a valid pair the whole document comes back untouched as `before`.
/// With one, each region is trimmed.
pub fn parse<'a>(doc: &'a str, markers: &MarkerPair) -> Sections<'a> {
    match scan(doc, markers) {
        Scan::Complete { start, end } => Sections {
            before: doc[..start].trim(),
            generated: doc[start + markers.start().len()..end].trim(),
            after: doc[end + markers.end().len()..].trim(),
        },
        Scan::NoStart | Scan::StartOnly { .. } => Sections::degenerate(doc),
    }
}

/// Remove every occurrence of either marker from `text`.
///
/// Repeats until nothing matches, since removing one occurrence can join
/// the pieces of another.
pub fn strip_markers(text: &str, markers: &MarkerPair) -> String {
    let mut out = text.to_string();
    while out.contains(markers.start()) || out.contains(markers.end()) {
        out = out.replace(markers.end(), "").replace(markers.start(), "");
    }
    out
}

/// Fence `content` between the markers, separated by blank lines.
pub fn wrap(content: &str, markers: &MarkerPair) -> String {
    format!("{}\n\n{}\n\n{}", markers.start(), content, markers.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn markers() -> MarkerPair {
        MarkerPair::from_base(DEFAULT_MARKER).unwrap()
    }

    #[test]
    fn default_marker_derives_end() {
        let m = markers();
        assert_eq!(m.start(), "<!-- gemini-pr-description -->");
        assert_eq!(m.end(), "<!-- gemini-pr-description-end -->");
    }

    #[test]
    fn end_keeps_spacing_before_close() {
        let m = MarkerPair::from_base("  <!--ai   -->  ").unwrap();
        assert_eq!(m.start(), "<!--ai   -->");
        assert_eq!(m.end(), "<!--ai-end   -->");

        let tight = MarkerPair::from_base("<!--ai-->").unwrap();
        assert_eq!(tight.end(), "<!--ai-end-->");
    }

    #[test]
    fn rejects_malformed_markers() {
        for bad in [
            "",
            "gemini",
            "<!-- gemini",
            "gemini -->",
            "<!--   -->",
            "<!---->",
            "<!-- a --> b -->",
            "<!-- a <!-- b -->",
        ] {
            assert!(
                matches!(MarkerPair::from_base(bad), Err(DescbotError::Configuration(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn no_markers_is_degenerate() {
        let s = parse("no markers here", &markers());
        assert_eq!(
            s,
            Sections {
                before: "no markers here",
                generated: "",
                after: "",
            }
        );
        assert!(!has_generated_content("no markers here", &markers()));
    }

    #[test]
    fn start_without_end_is_degenerate() {
        let doc = "intro\n<!-- gemini-pr-description -->\nhalf written";
        assert_eq!(parse(doc, &markers()), Sections::degenerate(doc));
        assert!(!has_generated_content(doc, &markers()));
    }

    #[test]
    fn end_before_start_is_degenerate() {
        let doc = "<!-- gemini-pr-description-end -->\nmiddle\n<!-- gemini-pr-description -->";
        assert_eq!(parse(doc, &markers()), Sections::degenerate(doc));
        assert!(!has_generated_content(doc, &markers()));
    }

    #[test]
    fn splits_around_generated_block() {
        let doc = "Notes\n\n<!-- gemini-pr-description -->\n\nOld\n\n<!-- gemini-pr-description-end -->\n\nFooter\n";
        let s = parse(doc, &markers());
        assert_eq!(s.before, "Notes");
        assert_eq!(s.generated, "Old");
        assert_eq!(s.after, "Footer");
        assert!(has_generated_content(doc, &markers()));
    }

    #[test]
    fn uses_first_end_after_first_start() {
        let doc = "<!-- gemini-pr-description-end -->a<!-- gemini-pr-description -->b<!-- gemini-pr-description-end -->c<!-- gemini-pr-description-end -->";
        let s = parse(doc, &markers());
        assert_eq!(s.before, "<!-- gemini-pr-description-end -->a");
        assert_eq!(s.generated, "b");
        assert_eq!(s.after, "c<!-- gemini-pr-description-end -->");
    }

    #[test]
    fn strip_removes_both_markers() {
        let m = markers();
        let text = "Intro\n<!-- gemini-pr-description-end -->\nmiddle <!-- gemini-pr-description --> end";
        assert_eq!(strip_markers(text, &m), "Intro\n\nmiddle  end");
        assert_eq!(strip_markers("plain text", &m), "plain text");
    }

    #[test]
    fn strip_handles_markers_rebuilt_by_removal() {
        let m = markers();
        let nested = "<!-- gemini-pr-<!-- gemini-pr-description -->description -->tail";
        let out = strip_markers(nested, &m);
        assert!(!out.contains(m.start()));
        assert_eq!(out, "tail");
    }

    #[test]
    fn wrap_then_parse_round_trips() {
        let m = markers();
        for text in ["", "New", "  padded \n", "## Overview\n\n- one\n- two", "ünïcödé ✓"] {
            let wrapped = wrap(text, &m);
            assert_eq!(parse(&wrapped, &m).generated, text.trim());
        }
    }

    #[test]
    fn round_trips_with_custom_marker() {
        let m = MarkerPair::from_base("<!-- release-notes -->").unwrap();
        let wrapped = wrap("body", &m);
        assert_eq!(
            wrapped,
            "<!-- release-notes -->\n\nbody\n\n<!-- release-notes-end -->"
        );
        assert_eq!(parse(&wrapped, &m).generated, "body");
    }
}
