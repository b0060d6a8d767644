use anyhow::Result;
use log::debug;

use crate::config::{Config, Provider};
use crate::github::GitHubClient;
use crate::llm::gemini::GeminiClient;
use crate::llm::ollama::OllamaClient;
use crate::llm::openai::OpenAiClient;
use crate::llm::{Generator, NoopGenerator};

/// Build the text generator based on CLI + config.
pub fn build_generator(cfg: &Config) -> Result<Box<dyn Generator>> {
    if cfg.no_model {
        debug!("Using NoopGenerator (no model calls)");
        return Ok(Box::new(NoopGenerator));
    }

    debug!("Using {} with model: {}", cfg.provider, cfg.model);

    let key = cfg.api_key.clone().unwrap_or_default();
    let generator: Box<dyn Generator> = match cfg.provider {
        Provider::Gemini => Box::new(GeminiClient::new(
            key,
            cfg.model.clone(),
            cfg.api_base_url.clone(),
            cfg.generation,
        )?),
        Provider::OpenAi => Box::new(OpenAiClient::new(
            key,
            cfg.model.clone(),
            cfg.api_base_url.clone(),
            cfg.generation,
        )?),
        Provider::Ollama => Box::new(OllamaClient::new(
            cfg.api_base_url.as_str(),
            cfg.model.as_str(),
            cfg.generation,
        )?),
    };
    Ok(generator)
}

/// Build the GitHub client for the configured pull request.
pub fn build_host(cfg: &Config) -> Result<GitHubClient> {
    debug!("Using GitHub API at {}", cfg.github_api_url);
    GitHubClient::new(
        cfg.github_token.clone(),
        &cfg.github_api_url,
        cfg.repo.clone(),
        cfg.pr_number,
    )
}
