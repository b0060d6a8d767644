use glob::Pattern;
use serde::Deserialize;
use std::cmp::Reverse;

/// Appended to a patch that was cut to fit the diff budget.
pub const TRUNCATION_SENTINEL: &str = "\n... [patch truncated]";

/// How a file changed in the pull request, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    /// A status this build does not know about yet.
    #[serde(other)]
    Unknown,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
            ChangeKind::Renamed => "renamed",
            ChangeKind::Copied => "copied",
            ChangeKind::Changed => "changed",
            ChangeKind::Unchanged => "unchanged",
            ChangeKind::Unknown => "unknown",
        }
    }
}

/// One changed file of the pull request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileChange {
    pub filename: String,
    #[serde(rename = "status")]
    pub kind: ChangeKind,
    pub additions: u32,
    pub deletions: u32,
    /// Missing for binary files and for diffs the host refuses to render.
    #[serde(default)]
    pub patch: Option<String>,
}

impl FileChange {
    pub fn patch_len(&self) -> usize {
        self.patch.as_deref().map_or(0, str::len)
    }
}

pub fn total_patch_len(files: &[FileChange]) -> usize {
    files.iter().map(FileChange::patch_len).sum()
}

/// Drop files matching any of `patterns`.
///
/// A pattern with no `/` is also tried against the basename, so `*.lock`
/// catches `web/yarn.lock`.
pub fn exclude(files: Vec<FileChange>, patterns: &[Pattern]) -> Vec<FileChange> {
    if patterns.is_empty() {
        return files;
    }

    files
        .into_iter()
        .filter(|file| {
            let excluded = patterns.iter().any(|p| matches_path(p, &file.filename));
            if excluded {
                log::debug!("Excluding {} from the prompt", file.filename);
            }
            !excluded
        })
        .collect()
}

fn matches_path(pattern: &Pattern, path: &str) -> bool {
    if pattern.matches(path) {
        return true;
    }
    if pattern.as_str().contains('/') {
        return false;
    }
    path.rsplit('/').next().is_some_and(|base| pattern.matches(base))
}

/// Fit the patches of `files` into `max_bytes`.
///
/// The largest patches give way first: each file, biggest patch first, keeps
/// its whole patch if it still fits, a truncated prefix ending in
/// [`TRUNCATION_SENTINEL`] if there is room for more than the sentinel, and
/// no patch at all otherwise. File metadata is always kept. The result is
/// ordered by filename.
pub fn reduce(mut files: Vec<FileChange>, max_bytes: usize) -> Vec<FileChange> {
    files.sort_by(|a, b| a.filename.cmp(&b.filename));

    let total = total_patch_len(&files);
    if total <= max_bytes {
        return files;
    }

    // Stable sort over filename order: equal sizes are visited by filename.
    let mut order: Vec<usize> = (0..files.len()).collect();
    order.sort_by_key(|&i| Reverse(files[i].patch_len()));

    let mut remaining = max_bytes;
    let mut truncated = 0usize;
    let mut dropped = 0usize;

    for i in order {
        let file = &mut files[i];
        let Some(patch) = file.patch.take() else {
            continue;
        };

        if patch.len() <= remaining {
            remaining -= patch.len();
            file.patch = Some(patch);
        } else if remaining > TRUNCATION_SENTINEL.len() {
            let cut = floor_char_boundary(&patch, remaining - TRUNCATION_SENTINEL.len());
            let mut kept = patch[..cut].to_string();
            kept.push_str(TRUNCATION_SENTINEL);
            remaining -= kept.len();
            file.patch = Some(kept);
            truncated += 1;
        } else {
            dropped += 1;
        }
    }

    log::info!(
        "Diff is {total} bytes, over the {max_bytes} byte budget: truncated {truncated} patch(es), dropped {dropped}"
    );

    files
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
