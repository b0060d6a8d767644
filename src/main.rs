mod cli_args;
mod config;
mod diff;
mod error;
mod git;
mod github;
mod llm;
mod logging;
mod marker;
mod orchestrator;
mod output;
mod policy;
mod retry;
mod setup;

use anyhow::Result;
use clap::Parser;
use std::env;

pub use cli_args::Cli;
use config::Config;
use retry::RetryPolicy;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let runner_debug = env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1");
    logging::init_logger(cli.verbose, runner_debug);

    if let Err(err) = run(&cli) {
        if env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true") {
            output::annotate_error(&format!("{err:#}"));
        }
        return Err(err);
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let cfg = Config::from_sources(cli)?;
    log::info!(
        "{}#{}: mode {}, model {}",
        cfg.repo,
        cfg.pr_number,
        cfg.update_mode,
        cfg.model
    );

    let host = setup::build_host(&cfg)?;
    let generator = setup::build_generator(&cfg)?;

    let outcome = orchestrator::run(
        &cfg,
        &host,
        generator.as_ref(),
        RetryPolicy::default(),
        std::thread::sleep,
    )?;

    output::report(&outcome)
}
