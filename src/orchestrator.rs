use std::time::Duration;

use crate::config::Config;
use crate::diff;
use crate::error::DescbotError;
use crate::github::PullRequestHost;
use crate::llm::Generator;
use crate::llm::prompt_builder;
use crate::policy;
use crate::retry::{self, RetryPolicy};

/// What a run produced, for the action outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// The description as it stands after the run.
    pub description: String,
    /// Whether the generator was called.
    pub generated: bool,
    /// Whether the description was written back to the host.
    pub updated: bool,
    pub model: String,
}

/// Fetch, decide, generate, splice, persist.
///
/// Nothing is written unless every earlier step succeeded, and the write is
/// attempted at most once.
pub fn run<S>(
    config: &Config,
    host: &dyn PullRequestHost,
    generator: &dyn Generator,
    retry_policy: RetryPolicy,
    sleep: S,
) -> Result<RunOutcome, DescbotError>
where
    S: FnMut(Duration),
{
    let pr = host
        .pull_request()
        .map_err(|e| DescbotError::fetch("pull request", &e))?;

    log::info!("Pull request #{}: {}", pr.number, pr.title);

    let decision = policy::should_generate(&pr.body, config.update_mode);
    log::info!(
        "Update mode {}: {} ({})",
        config.update_mode,
        if decision.generate { "generating" } else { "skipping" },
        decision.reason
    );
    if !decision.generate {
        return Ok(RunOutcome {
            description: pr.body,
            generated: false,
            updated: false,
            model: generator.model().to_string(),
        });
    }

    let files = host
        .files()
        .map_err(|e| DescbotError::fetch("changed files", &e))?;
    let commits = host
        .commits()
        .map_err(|e| DescbotError::fetch("commits", &e))?;

    let files = diff::exclude(files, &config.exclude_patterns);
    let files = diff::reduce(files, config.max_diff_size);
    log::debug!(
        "Prompting with {} file(s), {} patch bytes, {} commit(s)",
        files.len(),
        diff::total_patch_len(&files),
        commits.len()
    );

    let prompts = prompt_builder::pr_description_prompt(
        &pr,
        &files,
        &commits,
        config.extra_context.as_deref(),
    );

    let generated = retry::generate_with_retry(
        generator,
        &prompts.system,
        &prompts.user,
        retry_policy,
        retry::classify,
        sleep,
    )?;

    let description =
        policy::apply_update_mode(&pr.body, &generated, config.update_mode, &config.markers);

    let updated = if config.dry_run {
        log::info!("Dry run: leaving the pull request untouched");
        false
    } else if description == pr.body {
        log::info!("Description unchanged, nothing to write");
        false
    } else {
        host.update_body(&description)
            .map_err(|e| DescbotError::Persist(format!("{e:#}")))?;
        true
    };

    Ok(RunOutcome {
        description,
        generated: true,
        updated,
        model: generator.model().to_string(),
    })
}
