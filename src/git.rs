use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as GitCommand;

use crate::llm::GenerationResult;
use crate::llm::prompt_builder::RepositoryContext;
use crate::llm::prompts::DEFAULT_PR_TEMPLATE;
use crate::session::ResultConsumer;

const TEMPLATE_FILES: [&str; 2] = ["pull_request_template.md", "PULL_REQUEST_TEMPLATE.md"];

/// Run a git command and capture trimmed stdout as String.
pub fn git_output(args: &[&str]) -> Result<String> {
    run_git(None, args)
}

/// Like [`git_output`], but against the repository at `dir` (`git -C <dir>`).
pub fn git_output_in(dir: &Path, args: &[&str]) -> Result<String> {
    run_git(Some(dir), args)
}

fn run_git(dir: Option<&Path>, args: &[&str]) -> Result<String> {
    let mut cmd = GitCommand::new("git");
    if let Some(dir) = dir {
        cmd.arg("-C").arg(dir);
    }

    let output = cmd
        .args(args)
        .output()
        .with_context(|| format!("failed to run git {:?}", args))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        // `git commit` explains "nothing to commit" on stdout.
        let reason = if stderr.trim().is_empty() { stdout } else { stderr };
        return Err(anyhow!(
            "git {:?} exited with status {:?}: {}",
            args,
            output.status.code(),
            reason.trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Absolute path of the working tree root.
pub fn repo_root() -> Result<PathBuf> {
    let root = git_output(&["rev-parse", "--show-toplevel"])?;
    Ok(PathBuf::from(root))
}

/// Get the full staged diff.
pub fn staged_diff() -> Result<String> {
    git_output(&["diff", "--staged"])
}

/// Diff of the working tree against `origin/<branch>`.
pub fn branch_diff(branch: &str) -> Result<String> {
    git_output(&["diff", &format!("origin/{branch}")])
}

/// One line per commit reachable from HEAD but not from `origin/<branch>`.
pub fn unique_commits(branch: &str) -> Result<String> {
    git_output(&[
        "log",
        &format!("origin/{branch}..HEAD"),
        "--pretty=format:%h - %s",
    ])
}

/// Read the repository's PR template, or fall back to the built-in one.
pub fn pr_template(root: &Path) -> String {
    let dir = root.join(".github");
    for name in TEMPLATE_FILES {
        let path = dir.join(name);
        match fs::read_to_string(&path) {
            Ok(text) => {
                log::debug!("Using PR template {path:?}");
                return text;
            }
            Err(e) => log::trace!("No PR template at {path:?}: {e}"),
        }
    }

    log::debug!("Using built-in PR template");
    DEFAULT_PR_TEMPLATE.to_string()
}

/// Repository data for a commit message.
pub fn commit_context() -> Result<RepositoryContext> {
    Ok(RepositoryContext::Commit {
        diff: staged_diff()?,
    })
}

/// Repository data for a PR description against `origin/<branch>`.
///
/// Commits and template are only read when there is a diff to describe.
pub fn pull_request_context(branch: &str) -> Result<RepositoryContext> {
    let diff = branch_diff(branch)?;
    if diff.is_empty() {
        return Ok(RepositoryContext::PullRequest {
            branch: branch.to_string(),
            diff,
            commits: String::new(),
            template: String::new(),
        });
    }

    let root = repo_root()?;
    Ok(RepositoryContext::PullRequest {
        branch: branch.to_string(),
        commits: unique_commits(branch)?,
        template: pr_template(&root),
        diff,
    })
}

/// Create a commit in `dir` with exactly the given message.
pub fn commit(dir: &Path, message: &str) -> Result<()> {
    git_output_in(dir, &["commit", "-m", message]).context("git commit failed")?;
    Ok(())
}

/// Commits the accepted message in the given working tree.
pub struct GitCommitter {
    workdir: PathBuf,
}

impl GitCommitter {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        GitCommitter {
            workdir: workdir.into(),
        }
    }
}

impl ResultConsumer for GitCommitter {
    fn consume(&mut self, result: &GenerationResult) -> Result<()> {
        match result {
            GenerationResult::Commit { message } => {
                log::info!("Creating commit in {:?}", self.workdir);
                commit(&self.workdir, message)
            }
            GenerationResult::PullRequest { .. } => {
                Err(anyhow!("cannot create a commit from a pull request description"))
            }
        }
    }
}
