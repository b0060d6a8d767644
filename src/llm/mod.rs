pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod prompt_builder;
mod prompts;

use anyhow::Result;

/// Sampling knobs passed through to whichever backend is in use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A text-generation backend: one system prompt and one user prompt in, one
/// block of text out. Retrying is the caller's business.
pub trait Generator: Send + Sync {
    fn generate(&self, system: &str, user: &str) -> Result<String>;

    /// Model identifier, reported as an action output.
    fn model(&self) -> &str;
}

/// Stand-in backend for `--no-model`: answers without any network call.
pub struct NoopGenerator;

impl Generator for NoopGenerator {
    fn generate(&self, _system: &str, user: &str) -> Result<String> {
        let title = user
            .lines()
            .find_map(|l| l.strip_prefix("Title: "))
            .unwrap_or("(untitled)");
        Ok(format!(
            "Dummy PR description for testing\n\nTitle: {title}\n\n(LLM disabled)"
        ))
    }

    fn model(&self) -> &str {
        "none"
    }
}

/// Truncate long strings for debug logging.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut cut = max_len;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...\n[truncated {} chars]", &s[..cut], s.len() - cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_generator_echoes_title() {
        let text = NoopGenerator
            .generate("system", "Title: Add retries\nBase branch: main")
            .unwrap();
        assert!(text.contains("Add retries"));
        assert_eq!(NoopGenerator.model(), "none");
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        let out = truncate("ééééé", 3);
        assert!(out.starts_with("é..."));
        assert!(out.ends_with("[truncated 8 chars]"));
    }
}
