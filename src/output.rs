use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

use crate::orchestrator::RunOutcome;

/// Print the final description and, under GitHub Actions, publish it as
/// step outputs.
pub fn report(outcome: &RunOutcome) -> Result<()> {
    println!();
    println!("----- PR Description Preview -----");
    println!("{}", outcome.description);
    println!("----------------------------------");

    if !outcome.generated {
        println!("No description generated for this update mode.");
    } else if outcome.updated {
        println!("Pull request description updated.");
    }

    if let Some(path) = std::env::var_os("GITHUB_OUTPUT").filter(|p| !p.is_empty()) {
        write_outputs(Path::new(&path), outcome)?;
    }
    Ok(())
}

fn write_outputs(path: &Path, outcome: &RunOutcome) -> Result<()> {
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open GITHUB_OUTPUT at {}", path.display()))?;
    file.write_all(format_outputs(outcome, &delimiter).as_bytes())
        .with_context(|| format!("failed to write GITHUB_OUTPUT at {}", path.display()))?;
    log::debug!("Wrote step outputs to {}", path.display());
    Ok(())
}

/// Emit an `::error::` workflow command so the failure shows up as an
/// annotation on the run.
pub fn annotate_error(message: &str) {
    println!("::error::{}", escape_command_data(message));
}

fn escape_command_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// `GITHUB_OUTPUT` file syntax. The description goes through a heredoc so
/// newlines survive.
fn format_outputs(outcome: &RunOutcome, delimiter: &str) -> String {
    format!(
        "description<<{delimiter}\n{}\n{delimiter}\ngenerated={}\nmodel={}\n",
        outcome.description, outcome.generated, outcome.model
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn outcome() -> RunOutcome {
        RunOutcome {
            description: "Intro\n\n## Changes\n- one".into(),
            generated: true,
            updated: true,
            model: "gemini-2.5-flash".into(),
        }
    }

    #[test]
    fn outputs_use_heredoc_for_description() {
        assert_eq!(
            format_outputs(&outcome(), "EOF_1"),
            "description<<EOF_1\nIntro\n\n## Changes\n- one\nEOF_1\ngenerated=true\nmodel=gemini-2.5-flash\n"
        );
    }

    #[test]
    fn error_annotations_stay_on_one_line() {
        assert_eq!(
            escape_command_data("failed: 100%\nsecond line\r"),
            "failed: 100%25%0Asecond line%0D"
        );
    }

    #[test]
    fn outputs_are_appended_to_the_file() {
        let path = std::env::temp_dir().join(format!("descbot-output-{}", Uuid::new_v4()));
        std::fs::write(&path, "earlier=1\n").unwrap();

        let mut skipped = outcome();
        skipped.generated = false;
        write_outputs(&path, &skipped).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(written.starts_with("earlier=1\ndescription<<ghadelimiter_"));
        assert!(written.contains("\ngenerated=false\n"));
        assert!(written.ends_with("model=gemini-2.5-flash\n"));
    }
}
