pub mod decode;
pub mod openai;
pub mod prompt_builder;
pub(crate) mod prompts;

use crate::error::GenerationError;

/// What we are asking the model to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Commit,
    PullRequest,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Commit => "commit",
            Mode::PullRequest => "pull request",
        }
    }
}

/// A fully validated reply from the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Commit { message: String },
    PullRequest { title: String, description: String },
}

impl GenerationResult {
    /// The semantic-release line: commit message or PR title.
    pub fn headline(&self) -> &str {
        match self {
            GenerationResult::Commit { message } => message,
            GenerationResult::PullRequest { title, .. } => title,
        }
    }
}

/// Split `"<type>: <summary>"` into its parts.
///
/// Returns `None` for the type when the headline does not follow the
/// convention; callers then show the whole line unsplit.
pub fn split_semantic(headline: &str) -> (Option<&str>, &str) {
    match headline.split_once(": ") {
        Some((kind, summary)) if is_type_token(kind) => (Some(kind), summary),
        _ => (None, headline),
    }
}

// Accepts scoped and breaking forms too: `feat(api)`, `fix!`.
fn is_type_token(kind: &str) -> bool {
    !kind.is_empty()
        && kind.len() <= 24
        && !kind.contains(char::is_whitespace)
}

/// Trait for talking to the generation API.
pub trait LlmClient: Send + Sync {
    /// Send one prompt and decode the reply into the shape `mode` requires.
    ///
    /// Exactly one request is made per call.
    fn generate(&self, prompt: &str, mode: Mode) -> Result<GenerationResult, GenerationError>;
}
