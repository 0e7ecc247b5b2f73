//! The generation-and-revision loop.
//!
//! A session generates once, shows the result, and then reacts to one user
//! decision per iteration until the user accepts or cancels. Every state and
//! its exits live in [`State`]; each transition has its own handler.

use anyhow::Result;

use crate::llm::prompt_builder::{PromptBuilder, RepositoryContext};
use crate::llm::{GenerationResult, LlmClient};

/// One decision taken at the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Accept,
    Regenerate,
    AddContext,
    Cancel,
}

impl Action {
    /// Map raw menu input to an action. `None` means the input was not recognized.
    ///
    /// Empty input cancels, the same as closing stdin.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim().to_lowercase().as_str() {
            "y" | "yes" | "a" | "accept" => Some(Action::Accept),
            "r" | "n" | "regenerate" => Some(Action::Regenerate),
            "e" | "edit" | "context" => Some(Action::AddContext),
            "c" | "cancel" | "q" | "" => Some(Action::Cancel),
            _ => None,
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(GenerationResult),
    Cancelled,
    NoChanges,
}

/// Things the loop tells the user that are not results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NoChanges,
    Regenerating,
    InvalidOption,
    Accepted,
    Cancelled,
}

/// The user-facing side of the loop.
pub trait Interaction {
    /// Show a freshly generated result.
    fn present(&mut self, result: &GenerationResult) -> Result<()>;

    /// Ask for the next decision and return the raw input.
    fn choose(&mut self) -> Result<String>;

    /// Ask for free-text guidance for the next generation.
    fn ask_context(&mut self) -> Result<String>;

    fn notify(&mut self, notice: Notice) -> Result<()>;
}

/// Performs the terminal action once a result is accepted.
pub trait ResultConsumer {
    fn consume(&mut self, result: &GenerationResult) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Starting,
    AwaitingDecision,
    Regenerating,
    AddingContext,
    Terminated(Outcome),
}

/// Everything the loop mutates.
#[derive(Debug)]
pub struct SessionState {
    pub current_result: Option<GenerationResult>,
    pub accumulated_context: String,
    pub state: State,
}

impl SessionState {
    fn new() -> Self {
        SessionState {
            current_result: None,
            accumulated_context: String::new(),
            state: State::Starting,
        }
    }
}

pub struct RevisionLoop<'a> {
    builder: PromptBuilder,
    repository: &'a RepositoryContext,
    llm: &'a dyn LlmClient,
    interaction: &'a mut dyn Interaction,
    consumer: &'a mut dyn ResultConsumer,
    session: SessionState,
}

impl<'a> RevisionLoop<'a> {
    pub fn new(
        repository: &'a RepositoryContext,
        llm: &'a dyn LlmClient,
        interaction: &'a mut dyn Interaction,
        consumer: &'a mut dyn ResultConsumer,
    ) -> Self {
        RevisionLoop {
            builder: PromptBuilder::new(repository.mode()),
            repository,
            llm,
            interaction,
            consumer,
            session: SessionState::new(),
        }
    }

    /// Drive the session to a terminal state.
    ///
    /// Generation and consumer failures end the session with an error; the
    /// previous result is never reused.
    pub fn run(mut self) -> Result<Outcome> {
        if !self.repository.has_changes() {
            self.interaction.notify(Notice::NoChanges)?;
            return Ok(Outcome::NoChanges);
        }

        let repository_context = self.repository.render();

        loop {
            let next = match self.session.state.clone() {
                State::Starting | State::Regenerating => self.on_generate(&repository_context)?,
                State::AwaitingDecision => self.on_decision()?,
                State::AddingContext => self.on_add_context(&repository_context)?,
                State::Terminated(outcome) => return Ok(outcome),
            };
            log::trace!("Session {:?} -> {:?}", self.session.state, next);
            self.session.state = next;
        }
    }

    fn on_generate(&mut self, repository_context: &str) -> Result<State> {
        if self.session.state == State::Regenerating {
            self.interaction.notify(Notice::Regenerating)?;
        }
        self.generate(repository_context)?;
        Ok(State::AwaitingDecision)
    }

    fn on_decision(&mut self) -> Result<State> {
        let input = self.interaction.choose()?;

        let Some(action) = Action::from_choice(&input) else {
            log::debug!("Unrecognized menu input {input:?}");
            self.interaction.notify(Notice::InvalidOption)?;
            return Ok(State::AwaitingDecision);
        };

        match action {
            Action::Accept => self.on_accept(),
            Action::Regenerate => Ok(State::Regenerating),
            Action::AddContext => Ok(State::AddingContext),
            Action::Cancel => {
                self.interaction.notify(Notice::Cancelled)?;
                Ok(State::Terminated(Outcome::Cancelled))
            }
        }
    }

    fn on_accept(&mut self) -> Result<State> {
        let Some(result) = self.session.current_result.take() else {
            // Only reachable if a state was entered out of order.
            anyhow::bail!("no generated result to accept");
        };
        self.consumer.consume(&result)?;
        self.interaction.notify(Notice::Accepted)?;
        Ok(State::Terminated(Outcome::Accepted(result)))
    }

    fn on_add_context(&mut self, repository_context: &str) -> Result<State> {
        // Replaces, never appends, the previous guidance.
        self.session.accumulated_context = self.interaction.ask_context()?;
        self.interaction.notify(Notice::Regenerating)?;
        self.generate(repository_context)?;
        Ok(State::AwaitingDecision)
    }

    fn generate(&mut self, repository_context: &str) -> Result<()> {
        self.session.current_result = None;

        let prompt = self
            .builder
            .build(repository_context, &self.session.accumulated_context);
        let result = self.llm.generate(&prompt, self.repository.mode())?;

        self.interaction.present(&result)?;
        self.session.current_result = Some(result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::llm::Mode;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies and records every prompt it receives.
    struct ScriptedLlm {
        replies: Mutex<VecDeque<Result<GenerationResult, GenerationError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<Result<GenerationResult, GenerationError>>) -> Self {
            ScriptedLlm {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn commits(messages: &[&str]) -> Self {
            Self::new(messages.iter().map(|m| Ok(commit(m))).collect())
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn prompt(&self, idx: usize) -> String {
            self.prompts.lock().unwrap()[idx].clone()
        }
    }

    impl LlmClient for ScriptedLlm {
        fn generate(&self, prompt: &str, _mode: Mode) -> Result<GenerationResult, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("more generations than scripted")
        }
    }

    #[derive(Default)]
    struct ScriptedUser {
        choices: VecDeque<&'static str>,
        contexts: VecDeque<&'static str>,
        presented: Vec<GenerationResult>,
        notices: Vec<Notice>,
    }

    impl ScriptedUser {
        fn new(choices: &[&'static str], contexts: &[&'static str]) -> Self {
            ScriptedUser {
                choices: choices.iter().copied().collect(),
                contexts: contexts.iter().copied().collect(),
                ..Default::default()
            }
        }
    }

    impl Interaction for ScriptedUser {
        fn present(&mut self, result: &GenerationResult) -> Result<()> {
            self.presented.push(result.clone());
            Ok(())
        }

        fn choose(&mut self) -> Result<String> {
            Ok(self.choices.pop_front().expect("more decisions than scripted").to_string())
        }

        fn ask_context(&mut self) -> Result<String> {
            Ok(self.contexts.pop_front().expect("more contexts than scripted").to_string())
        }

        fn notify(&mut self, notice: Notice) -> Result<()> {
            self.notices.push(notice);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingConsumer {
        consumed: Vec<GenerationResult>,
        fail: bool,
    }

    impl ResultConsumer for RecordingConsumer {
        fn consume(&mut self, result: &GenerationResult) -> Result<()> {
            if self.fail {
                anyhow::bail!("git commit exited with status Some(1)");
            }
            self.consumed.push(result.clone());
            Ok(())
        }
    }

    fn commit(message: &str) -> GenerationResult {
        GenerationResult::Commit {
            message: message.to_string(),
        }
    }

    fn staged(diff: &str) -> RepositoryContext {
        RepositoryContext::Commit { diff: diff.into() }
    }

    fn run(
        repo: &RepositoryContext,
        llm: &ScriptedLlm,
        user: &mut ScriptedUser,
        consumer: &mut RecordingConsumer,
    ) -> Result<Outcome> {
        RevisionLoop::new(repo, llm, user, consumer).run()
    }

    #[test]
    fn empty_diff_ends_without_calling_the_api() {
        let llm = ScriptedLlm::commits(&[]);
        let mut user = ScriptedUser::default();
        let mut consumer = RecordingConsumer::default();

        let outcome = run(&staged(""), &llm, &mut user, &mut consumer).unwrap();

        assert_eq!(outcome, Outcome::NoChanges);
        assert_eq!(llm.calls(), 0);
        assert_eq!(user.notices, vec![Notice::NoChanges]);
        assert!(consumer.consumed.is_empty());
    }

    #[test]
    fn regenerate_then_accept_consumes_the_second_result() {
        let llm = ScriptedLlm::commits(&["fix: first", "fix: second"]);
        let mut user = ScriptedUser::new(&["r", "y"], &[]);
        let mut consumer = RecordingConsumer::default();

        let outcome = run(&staged("+x"), &llm, &mut user, &mut consumer).unwrap();

        assert_eq!(outcome, Outcome::Accepted(commit("fix: second")));
        assert_eq!(llm.calls(), 2);
        assert_eq!(consumer.consumed, vec![commit("fix: second")]);
        assert_eq!(user.presented.len(), 2);
    }

    #[test]
    fn regenerate_resends_the_same_prompt() {
        let llm = ScriptedLlm::commits(&["fix: a", "fix: b"]);
        let mut user = ScriptedUser::new(&["r", "c"], &[]);
        let mut consumer = RecordingConsumer::default();

        run(&staged("+x"), &llm, &mut user, &mut consumer).unwrap();

        assert_eq!(llm.prompt(0), llm.prompt(1));
    }

    #[test]
    fn cancel_after_first_generation_has_no_side_effect() {
        let llm = ScriptedLlm::commits(&["fix: only"]);
        let mut user = ScriptedUser::new(&["c"], &[]);
        let mut consumer = RecordingConsumer::default();

        let outcome = run(&staged("+x"), &llm, &mut user, &mut consumer).unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(llm.calls(), 1);
        assert!(consumer.consumed.is_empty());
        assert_eq!(user.notices, vec![Notice::Cancelled]);
    }

    #[test]
    fn add_context_replaces_previous_context() {
        let llm = ScriptedLlm::commits(&["fix: a", "fix: b", "fix: c"]);
        let mut user = ScriptedUser::new(
            &["e", "e", "c"],
            &["mention the cache layer", "it is a perf change"],
        );
        let mut consumer = RecordingConsumer::default();

        run(&staged("+x"), &llm, &mut user, &mut consumer).unwrap();

        assert_eq!(llm.calls(), 3);
        assert!(!llm.prompt(0).contains("mention the cache layer"));
        assert!(llm.prompt(1).contains("mention the cache layer"));

        let second = llm.prompt(2);
        assert!(second.contains("it is a perf change"));
        assert!(!second.contains("mention the cache layer"));
    }

    #[test]
    fn regenerate_keeps_the_accumulated_context() {
        let llm = ScriptedLlm::commits(&["fix: a", "fix: b", "fix: c"]);
        let mut user = ScriptedUser::new(&["e", "r", "c"], &["scope is the parser"]);
        let mut consumer = RecordingConsumer::default();

        run(&staged("+x"), &llm, &mut user, &mut consumer).unwrap();

        assert_eq!(llm.prompt(1), llm.prompt(2));
        assert!(llm.prompt(2).contains("scope is the parser"));
    }

    #[test]
    fn invalid_input_reprompts_without_generating() {
        let llm = ScriptedLlm::commits(&["feat: x"]);
        let mut user = ScriptedUser::new(&["z", "maybe", "y"], &[]);
        let mut consumer = RecordingConsumer::default();

        let outcome = run(&staged("+x"), &llm, &mut user, &mut consumer).unwrap();

        assert_eq!(outcome, Outcome::Accepted(commit("feat: x")));
        assert_eq!(llm.calls(), 1);
        assert_eq!(
            user.notices,
            vec![Notice::InvalidOption, Notice::InvalidOption, Notice::Accepted]
        );
    }

    #[test]
    fn failed_regeneration_ends_the_session() {
        let llm = ScriptedLlm::new(vec![
            Ok(commit("fix: a")),
            Err(GenerationError::Api {
                status: 500,
                reason: "Internal Server Error".into(),
                detail: String::new(),
            }),
        ]);
        let mut user = ScriptedUser::new(&["r"], &[]);
        let mut consumer = RecordingConsumer::default();

        let err = run(&staged("+x"), &llm, &mut user, &mut consumer).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<GenerationError>(),
            Some(GenerationError::Api { status: 500, .. })
        ));
        assert!(consumer.consumed.is_empty());
    }

    #[test]
    fn failed_initial_generation_never_asks_for_a_decision() {
        let llm = ScriptedLlm::new(vec![Err(GenerationError::malformed("not json"))]);
        let mut user = ScriptedUser::default();
        let mut consumer = RecordingConsumer::default();

        let err = run(&staged("+x"), &llm, &mut user, &mut consumer).unwrap_err();

        assert!(err.downcast_ref::<GenerationError>().is_some());
        assert!(user.presented.is_empty());
    }

    #[test]
    fn consumer_failure_is_surfaced() {
        let llm = ScriptedLlm::commits(&["fix: a"]);
        let mut user = ScriptedUser::new(&["y"], &[]);
        let mut consumer = RecordingConsumer {
            fail: true,
            ..Default::default()
        };

        let err = run(&staged("+x"), &llm, &mut user, &mut consumer).unwrap_err();

        assert!(err.to_string().contains("git commit"));
        assert!(!user.notices.contains(&Notice::Accepted));
    }

    #[test]
    fn pull_request_sessions_use_pr_results() {
        let pr = GenerationResult::PullRequest {
            title: "feat: y".into(),
            description: "## Scope".into(),
        };
        let llm = ScriptedLlm::new(vec![Ok(pr.clone())]);
        let mut user = ScriptedUser::new(&["accept"], &[]);
        let mut consumer = RecordingConsumer::default();
        let repo = RepositoryContext::PullRequest {
            branch: "release".into(),
            diff: "+y".into(),
            commits: "abc - feat: y".into(),
            template: "## Scope".into(),
        };

        let outcome = run(&repo, &llm, &mut user, &mut consumer).unwrap();

        assert_eq!(outcome, Outcome::Accepted(pr.clone()));
        assert_eq!(consumer.consumed, vec![pr]);
        assert!(llm.prompt(0).contains("origin/release"));
    }

    #[test]
    fn action_parsing() {
        assert_eq!(Action::from_choice(" Y "), Some(Action::Accept));
        assert_eq!(Action::from_choice("r"), Some(Action::Regenerate));
        assert_eq!(Action::from_choice("E"), Some(Action::AddContext));
        assert_eq!(Action::from_choice("cancel"), Some(Action::Cancel));
        assert_eq!(Action::from_choice(""), Some(Action::Cancel));
        assert_eq!(Action::from_choice("x"), None);
    }
}
