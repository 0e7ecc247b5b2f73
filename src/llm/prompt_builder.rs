use crate::llm::Mode;
use crate::llm::prompts;

/// Repository data gathered once at the start of a session.
#[derive(Debug, Clone)]
pub enum RepositoryContext {
    /// Staged changes for a commit.
    Commit { diff: String },
    /// Branch changes for a pull request against `origin/<branch>`.
    PullRequest {
        branch: String,
        diff: String,
        commits: String,
        template: String,
    },
}

impl RepositoryContext {
    pub fn mode(&self) -> Mode {
        match self {
            RepositoryContext::Commit { .. } => Mode::Commit,
            RepositoryContext::PullRequest { .. } => Mode::PullRequest,
        }
    }

    /// False when there is nothing to describe.
    pub fn has_changes(&self) -> bool {
        let diff = match self {
            RepositoryContext::Commit { diff } => diff,
            RepositoryContext::PullRequest { diff, .. } => diff,
        };
        !diff.trim().is_empty()
    }

    /// Render the opaque repository section of the prompt.
    pub fn render(&self) -> String {
        match self {
            RepositoryContext::Commit { diff } => {
                format!("# The staged diff is the following:\n{diff}")
            }
            RepositoryContext::PullRequest {
                branch,
                diff,
                commits,
                template,
            } => format!(
                "# PR TEMPLATE:\n{template}\n\n\
                 # Commits unique to this branch:\n{commits}\n\n\
                 # The diff against origin/{branch} is the following:\n{diff}"
            ),
        }
    }
}

/// One fully specified generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub preamble: &'static str,
    pub instructions: &'static str,
    pub repository_context: &'a str,
    pub user_context: &'a str,
}

impl GenerationRequest<'_> {
    pub fn render(&self) -> String {
        let mut prompt = String::new();
        prompt.push_str(self.preamble);
        prompt.push_str("\n\n");

        // Omitted entirely when empty; some providers react to an empty heading.
        let user_context = self.user_context.trim();
        if !user_context.is_empty() {
            prompt.push_str(prompts::USER_CONTEXT_HEADING);
            prompt.push('\n');
            prompt.push_str(user_context);
            prompt.push_str("\n\n");
        }

        prompt.push_str(self.instructions);
        prompt.push_str("\n\n");
        prompt.push_str(self.repository_context);
        prompt.push('\n');
        prompt
    }
}

/// Turns repository data and user guidance into the prompt text.
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    mode: Mode,
}

impl PromptBuilder {
    pub fn new(mode: Mode) -> Self {
        PromptBuilder { mode }
    }

    pub fn request<'a>(
        &self,
        repository_context: &'a str,
        user_context: &'a str,
    ) -> GenerationRequest<'a> {
        let (preamble, instructions) = match self.mode {
            Mode::Commit => (prompts::COMMIT_PREAMBLE, prompts::COMMIT_INSTRUCTIONS),
            Mode::PullRequest => (prompts::PR_PREAMBLE, prompts::PR_INSTRUCTIONS),
        };

        GenerationRequest {
            preamble,
            instructions,
            repository_context,
            user_context,
        }
    }

    pub fn build(&self, repository_context: &str, user_context: &str) -> String {
        self.request(repository_context, user_context).render()
    }
}
