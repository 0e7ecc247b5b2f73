use clap::{ArgAction, Parser, Subcommand};

pub const DEFAULT_PR_BRANCH: &str = "release";

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "semcommit",
    version,
    about = "Semantic-release commit messages and PR descriptions, written by an LLM from your diff"
)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Model name to use (otherwise AI_API_MODEL or the config file)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// API bearer token (otherwise uses AI_API_TOKEN env var)
    #[arg(long, env = "AI_API_TOKEN", hide_env_values = true, global = true)]
    pub api_token: Option<String>,

    /// Seconds to wait for the API before giving up
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Subcommand (e.g. 'pr'); without one a commit message is generated for staged changes
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands, e.g. `semcommit pr develop`
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a Pull Request title and description against origin/<BRANCH>
    Pr {
        /// Target branch to compare against
        #[arg(default_value = DEFAULT_PR_BRANCH)]
        branch: String,
    },
}
