use crate::diff::FileChange;
use crate::github::{Commit, PullRequest};
use crate::llm::prompts;

pub struct PromptPair {
    pub system: String,
    pub user: String,
}

pub fn pr_description_prompt(
    pr: &PullRequest,
    files: &[FileChange],
    commits: &[Commit],
    extra_context: Option<&str>,
) -> PromptPair {
    let mut system = prompts::PR_DESCRIPTION.to_owned();
    if let Some(ctx) = extra_context {
        system.push_str("\nAdditional context from the author: ");
        system.push_str(ctx);
    }

    let mut user = format!(
        "Title: {title}\nBase branch: {base}\nHead branch: {head}\n\n",
        title = pr.title.trim(),
        base = pr.base_ref,
        head = pr.head_ref,
    );

    user.push_str(&render_commits(commits));
    user.push('\n');
    user.push_str(&render_file_list(files));
    user.push('\n');
    user.push_str(&render_patches(files));

    PromptPair { system, user }
}

fn render_commits(commits: &[Commit]) -> String {
    if commits.is_empty() {
        return "Commits: (none)\n".to_string();
    }

    let mut out = String::from("Commits (oldest first):\n");
    for commit in commits {
        out.push_str(&format!(
            "- {short}: {subject}\n",
            short = commit.short_sha(),
            subject = commit.subject()
        ));
    }
    out
}

fn render_file_list(files: &[FileChange]) -> String {
    let mut out = format!("Changed files ({}):\n", files.len());
    for file in files {
        out.push_str(&format!(
            "- {name} ({kind}, +{add} -{del})\n",
            name = file.filename,
            kind = file.kind.as_str(),
            add = file.additions,
            del = file.deletions
        ));
    }
    out
}

fn render_patches(files: &[FileChange]) -> String {
    let mut out = String::from("Diff:\n");
    for file in files {
        match &file.patch {
            Some(patch) => {
                out.push_str(&format!(
                    "\n### {name}\n```diff\n{patch}\n```\n",
                    name = file.filename
                ));
            }
            None => {
                out.push_str(&format!("\n### {name}\n[no patch available]\n", name = file.filename));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::ChangeKind;

    fn pr() -> PullRequest {
        PullRequest {
            number: 7,
            title: " Add retry loop ".into(),
            body: String::new(),
            head_ref: "feature/retry".into(),
            base_ref: "main".into(),
        }
    }

    #[test]
    fn user_prompt_lists_commits_files_and_patches() {
        let files = vec![
            FileChange {
                filename: "src/retry.rs".into(),
                kind: ChangeKind::Added,
                additions: 40,
                deletions: 0,
                patch: Some("+fn retry() {}".into()),
            },
            FileChange {
                filename: "logo.png".into(),
                kind: ChangeKind::Modified,
                additions: 0,
                deletions: 0,
                patch: None,
            },
        ];
        let commits = vec![Commit {
            sha: "0123456789abcdef".into(),
            message: "Add retry loop\n\nLonger body".into(),
        }];

        let prompts = pr_description_prompt(&pr(), &files, &commits, None);

        assert!(prompts.user.starts_with("Title: Add retry loop\nBase branch: main\nHead branch: feature/retry"));
        assert!(prompts.user.contains("- 0123456: Add retry loop\n"));
        assert!(!prompts.user.contains("Longer body"));
        assert!(prompts.user.contains("- src/retry.rs (added, +40 -0)"));
        assert!(prompts.user.contains("```diff\n+fn retry() {}\n```"));
        assert!(prompts.user.contains("### logo.png\n[no patch available]"));
        assert_eq!(prompts.system, prompts::PR_DESCRIPTION);
    }

    #[test]
    fn extra_context_goes_into_system_prompt() {
        let prompts = pr_description_prompt(&pr(), &[], &[], Some("Part of the Q3 cleanup"));
        assert!(prompts.system.ends_with("Part of the Q3 cleanup"));
        assert!(prompts.user.contains("Commits: (none)"));
        assert!(prompts.user.contains("Changed files (0):"));
    }
}
