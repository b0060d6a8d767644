use crate::Cli;
use crate::error::DescbotError;
use crate::git;
use crate::github;
use crate::llm::{GenerationSettings, gemini, ollama, openai};
use crate::marker::{DEFAULT_MARKER, MarkerPair};
use crate::policy::UpdateMode;
use glob::Pattern;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_MAX_DIFF_SIZE: usize = 50_000;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS_LIMIT: u32 = 32_768;
pub const TEMPERATURE_LIMIT: f32 = 2.0;

/// Which generator backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    OpenAi,
    Ollama,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
            Provider::Ollama => "ollama",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => gemini::DEFAULT_MODEL,
            Provider::OpenAi => openai::DEFAULT_MODEL,
            Provider::Ollama => ollama::DEFAULT_MODEL,
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Gemini => gemini::DEFAULT_BASE_URL,
            Provider::OpenAi => openai::DEFAULT_BASE_URL,
            Provider::Ollama => ollama::DEFAULT_BASE_URL,
        }
    }

    /// Provider-specific env var holding the API key, if the provider needs one.
    fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Provider::Gemini => Some("GEMINI_API_KEY"),
            Provider::OpenAi => Some("OPENAI_API_KEY"),
            Provider::Ollama => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = DescbotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAi),
            "ollama" => Ok(Provider::Ollama),
            other => Err(DescbotError::config(format!(
                "unknown provider {other:?} (expected gemini, openai or ollama)"
            ))),
        }
    }
}

/// Final resolved configuration for descbot. Built once, then only read.
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub github_api_url: String,
    pub repo: String,
    pub pr_number: u64,
    pub provider: Provider,
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub no_model: bool,
    pub update_mode: UpdateMode,
    pub markers: MarkerPair,
    pub max_diff_size: usize,
    pub exclude_patterns: Vec<Pattern>,
    pub generation: GenerationSettings,
    pub extra_context: Option<String>,
    pub dry_run: bool,
}

impl Config {
    /// Build the final config from CLI flags / action inputs, environment,
    /// TOML file, and defaults, and validate every value.
    ///
    /// Precedence:
    ///   1. CLI flags or `INPUT_*` action inputs
    ///   2. Provider env vars (`GITHUB_TOKEN`, `GEMINI_API_KEY`, `DESCBOT_MODEL`, ...)
    ///   3. TOML file (`--config` or `~/.config/descbot.toml`)
    ///   4. Hardcoded defaults
    pub fn from_sources(cli: &Cli) -> Result<Self, DescbotError> {
        let file_cfg = match &cli.config {
            Some(path) => load_file_config(path)?,
            None => default_config_path()
                .filter(|p| p.exists())
                .map(|p| load_file_config(&p))
                .transpose()?
                .unwrap_or_default(),
        };

        Self::resolve(cli, file_cfg, |key| env::var(key).ok(), git::detect_repo_id)
    }

    fn resolve<E, R>(
        cli: &Cli,
        file_cfg: FileConfig,
        env_var: E,
        detect_repo: R,
    ) -> Result<Self, DescbotError>
    where
        E: Fn(&str) -> Option<String>,
        R: FnOnce() -> Option<String>,
    {
        let env_var = |key: &str| non_empty(env_var(key));

        let update_mode = non_empty(cli.update_mode.clone())
            .or(file_cfg.update_mode)
            .map(|m| m.parse::<UpdateMode>())
            .transpose()?
            .unwrap_or(UpdateMode::Smart);

        let markers = MarkerPair::from_base(
            &non_empty(cli.generation_marker.clone())
                .or(file_cfg.generation_marker)
                .unwrap_or_else(|| DEFAULT_MARKER.to_string()),
        )?;

        let max_diff_size = parse_input::<usize>("max_diff_size", &cli.max_diff_size)?
            .or(file_cfg.max_diff_size)
            .unwrap_or(DEFAULT_MAX_DIFF_SIZE);
        if max_diff_size == 0 {
            return Err(DescbotError::config("max_diff_size must be at least 1"));
        }

        let max_tokens = parse_input::<u32>("max_tokens", &cli.max_tokens)?
            .or(file_cfg.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS);
        if !(1..=MAX_TOKENS_LIMIT).contains(&max_tokens) {
            return Err(DescbotError::config(format!(
                "max_tokens must be between 1 and {MAX_TOKENS_LIMIT}, got {max_tokens}"
            )));
        }

        let temperature = parse_input::<f32>("temperature", &cli.temperature)?
            .or(file_cfg.temperature)
            .unwrap_or(DEFAULT_TEMPERATURE);
        if !(0.0..=TEMPERATURE_LIMIT).contains(&temperature) {
            return Err(DescbotError::config(format!(
                "temperature must be between 0 and {TEMPERATURE_LIMIT}, got {temperature}"
            )));
        }

        let exclude_patterns = match non_empty(cli.exclude_patterns.clone()) {
            Some(raw) => split_patterns(&raw),
            None => file_cfg.exclude_patterns.unwrap_or_default(),
        };
        let exclude_patterns = compile_patterns(&exclude_patterns)?;

        let provider = non_empty(cli.provider.clone())
            .or(file_cfg.provider)
            .map(|p| p.parse::<Provider>())
            .transpose()?
            .unwrap_or(Provider::Gemini);

        let no_model = cli.no_model;
        let api_key = non_empty(cli.api_key.clone())
            .or_else(|| provider.api_key_env().and_then(&env_var))
            .or(file_cfg.api_key);
        if api_key.is_none() && !no_model {
            if let Some(var) = provider.api_key_env() {
                return Err(DescbotError::config(format!(
                    "an API key is required for {provider}: pass --api-key, set the api_key input, or set {var}"
                )));
            }
        }

        let model = if no_model {
            "none".to_string()
        } else {
            non_empty(cli.model.clone())
                .or_else(|| env_var("DESCBOT_MODEL"))
                .or(file_cfg.model)
                .unwrap_or_else(|| provider.default_model().to_string())
        };

        let api_base_url = non_empty(cli.api_base_url.clone())
            .or(file_cfg.api_base_url)
            .unwrap_or_else(|| provider.default_base_url().to_string());

        let github_token = non_empty(cli.github_token.clone())
            .or_else(|| env_var("GITHUB_TOKEN"))
            .or(file_cfg.github_token)
            .ok_or_else(|| {
                DescbotError::config(
                    "a GitHub token is required: pass --github-token, set the github_token input, or set GITHUB_TOKEN",
                )
            })?;

        let github_api_url =
            env_var("GITHUB_API_URL").unwrap_or_else(|| github::DEFAULT_API_URL.to_string());

        let repo = non_empty(cli.repo.clone())
            .or_else(detect_repo)
            .ok_or_else(|| {
                DescbotError::config("could not determine the repository: pass --repo owner/name")
            })?;
        validate_repo(&repo)?;

        let pr_number = match parse_input::<u64>("pr_number", &cli.pr_number)? {
            Some(n) => n,
            None => env_var("GITHUB_EVENT_PATH")
                .and_then(|path| fs::read_to_string(path).ok())
                .and_then(|payload| pr_number_from_event(&payload))
                .ok_or_else(|| {
                    DescbotError::config(
                        "could not determine the pull request number: pass --pr or run on a pull_request event",
                    )
                })?,
        };
        if pr_number == 0 {
            return Err(DescbotError::config("pull request number must be positive"));
        }

        Ok(Config {
            github_token,
            github_api_url,
            repo,
            pr_number,
            provider,
            api_key,
            model,
            api_base_url,
            no_model,
            update_mode,
            markers,
            max_diff_size,
            exclude_patterns,
            generation: GenerationSettings {
                max_tokens,
                temperature,
            },
            extra_context: non_empty(cli.context.clone()).or(file_cfg.context),
            // Placeholder text never reaches a real pull request.
            dry_run: cli.dry_run || no_model,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub github_token: Option<String>,
    pub update_mode: Option<String>,
    pub generation_marker: Option<String>,
    pub max_diff_size: Option<usize>,
    pub exclude_patterns: Option<Vec<String>>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub context: Option<String>,
}

/// Return `~/.config/descbot.toml`
fn default_config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("descbot.toml"))
}

fn load_file_config(path: &Path) -> Result<FileConfig, DescbotError> {
    let data = fs::read_to_string(path).map_err(|e| {
        DescbotError::config(format!("failed to read config file {}: {e}", path.display()))
    })?;
    toml::from_str::<FileConfig>(&data).map_err(|e| {
        DescbotError::config(format!("failed to parse config file {}: {e}", path.display()))
    })
}

/// GitHub passes unset action inputs as empty strings.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_input<T: FromStr>(name: &str, raw: &Option<String>) -> Result<Option<T>, DescbotError> {
    match non_empty(raw.clone()) {
        None => Ok(None),
        Some(value) => value.trim().parse::<T>().map(Some).map_err(|_| {
            DescbotError::config(format!("{name} must be a number, got {value:?}"))
        }),
    }
}

fn split_patterns(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>, DescbotError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| DescbotError::config(format!("invalid exclude pattern {p:?}: {e}")))
        })
        .collect()
}

fn validate_repo(repo: &str) -> Result<(), DescbotError> {
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(())
        }
        _ => Err(DescbotError::config(format!(
            "repository must look like owner/name, got {repo:?}"
        ))),
    }
}

/// Pull the PR number out of a GitHub Actions event payload.
fn pr_number_from_event(payload: &str) -> Option<u64> {
    let event: serde_json::Value = serde_json::from_str(payload).ok()?;
    event
        .pointer("/pull_request/number")
        .or_else(|| event.pointer("/issue/number").filter(|_| event.pointer("/issue/pull_request").is_some()))
        .or_else(|| event.get("number"))
        .and_then(serde_json::Value::as_u64)
}
