use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// CLI options.
///
/// Most options double as GitHub Action inputs: the runner exposes an input
/// named `update_mode` as `INPUT_UPDATE_MODE`, which clap picks up through
/// `env`. Values stay strings here; `Config::from_sources` validates them.
#[derive(Parser, Debug)]
#[command(
    name = "descbot",
    version,
    about = "LLM-written pull request descriptions, merged into the existing PR body",
    args_override_self = true
)]
pub struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// GitHub token (falls back to GITHUB_TOKEN)
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Repository as owner/name (defaults to the origin remote)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: Option<String>,

    /// Pull request number (defaults to the one in the Actions event payload)
    #[arg(long = "pr", env = "INPUT_PR_NUMBER")]
    pub pr_number: Option<String>,

    /// Generator backend: gemini, openai or ollama
    #[arg(long, env = "INPUT_PROVIDER")]
    pub provider: Option<String>,

    /// API key for the generator (falls back to GEMINI_API_KEY / OPENAI_API_KEY)
    #[arg(long, env = "INPUT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name (e.g. gemini-2.5-flash)
    #[arg(long, env = "INPUT_MODEL")]
    pub model: Option<String>,

    /// Override the generator API base URL
    #[arg(long, env = "INPUT_API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Disable model calls and preview a dummy description; implies --dry-run
    #[arg(long)]
    pub no_model: bool,

    /// How to merge with the existing description: empty, append, replace or smart
    #[arg(long, env = "INPUT_UPDATE_MODE")]
    pub update_mode: Option<String>,

    /// HTML comment that fences the generated block
    #[arg(long, env = "INPUT_GENERATION_MARKER")]
    pub generation_marker: Option<String>,

    /// Byte budget for patch text sent to the model
    #[arg(long, env = "INPUT_MAX_DIFF_SIZE")]
    pub max_diff_size: Option<String>,

    /// Comma or newline separated globs of files to leave out
    #[arg(long, env = "INPUT_EXCLUDE_PATTERNS")]
    pub exclude_patterns: Option<String>,

    /// Maximum tokens the model may produce (1-32768)
    #[arg(long, env = "INPUT_MAX_TOKENS")]
    pub max_tokens: Option<String>,

    /// Sampling temperature (0-2)
    #[arg(long, env = "INPUT_TEMPERATURE")]
    pub temperature: Option<String>,

    /// Extra guidance appended to the system prompt
    #[arg(long, env = "INPUT_CONTEXT")]
    pub context: Option<String>,

    /// Print the new description without writing it to the pull request
    #[arg(long)]
    pub dry_run: bool,

    /// TOML config file (defaults to ~/.config/descbot.toml)
    #[arg(long, env = "DESCBOT_CONFIG")]
    pub config: Option<PathBuf>,
}
