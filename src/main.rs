mod cli_args;
mod config;
mod error;
mod git;
mod llm;
mod logging;
mod session;
mod setup;
mod ui;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::env;

use crate::cli_args::{Cli, Command};
use crate::config::Config;
use crate::llm::LlmClient;
use crate::llm::prompt_builder::RepositoryContext;
use crate::session::{Outcome, ResultConsumer, RevisionLoop};
use crate::ui::{DescriptionPrinter, Spinning, Terminal};

/// Run one session over the given repository data.
fn run_session(
    repository: &RepositoryContext,
    llm: &dyn LlmClient,
    consumer: &mut dyn ResultConsumer,
) -> Result<Outcome> {
    let spinning = Spinning::new(llm);
    let mut terminal = Terminal::new(repository.mode());

    let outcome = RevisionLoop::new(repository, &spinning, &mut terminal, consumer).run()?;
    log::debug!("Session ended: {outcome:?}");
    Ok(outcome)
}

/// Resolve configuration and build the API client for this run.
fn connect(cli: &Cli) -> Result<Box<dyn LlmClient>> {
    let cfg = Config::from_sources(cli)?;
    setup::build_llm_client(&cfg)
}

/// Commit mode: message for the staged diff, committed on accept.
fn run_commit(cli: &Cli) -> Result<()> {
    let llm = connect(cli)?;
    let repository = git::commit_context()?;
    let mut committer = git::GitCommitter::new(env::current_dir()?);
    run_session(&repository, llm.as_ref(), &mut committer)?;
    Ok(())
}

/// PR mode: title and description against origin/<branch>.
fn run_pr(cli: &Cli, branch: &str) -> Result<()> {
    let llm = connect(cli)?;
    let repository = git::pull_request_context(branch)?;
    run_session(&repository, llm.as_ref(), &mut DescriptionPrinter)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    match &cli.command {
        // PR mode exits successfully on every path; errors are only reported.
        Some(Command::Pr { branch }) => {
            if let Err(e) = run_pr(&cli, branch) {
                eprintln!("{}", format!("❌ {e:#}").as_str().red());
            }
            Ok(())
        }
        None => run_commit(&cli),
    }
}
