//! Terminal side of a session: rendering, menu input, spinner.

use anyhow::Result;
use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use crossterm::tty::IsTty;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

use crate::error::GenerationError;
use crate::llm::{GenerationResult, LlmClient, Mode, split_semantic};
use crate::session::{Interaction, Notice, ResultConsumer};

/// Ask the user a question and return a trimmed input line.
///
/// End of input yields an empty string.
pub fn prompt_input(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(buf.trim().to_string())
}

/// `type:` in bold blue, the rest in green; unsplittable lines are shown whole.
pub fn render_headline(headline: &str) -> String {
    match split_semantic(headline) {
        (Some(kind), summary) => format!("{} {}", format!("{kind}:").as_str().bold().blue(), summary.green()),
        (None, whole) => whole.green().to_string(),
    }
}

/// Interactive terminal implementation of the session UI.
pub struct Terminal {
    mode: Mode,
}

impl Terminal {
    pub fn new(mode: Mode) -> Self {
        Terminal { mode }
    }

    fn menu(&self) -> String {
        let accept = match self.mode {
            Mode::Commit => "Accept and create the commit",
            Mode::PullRequest => "Accept and print the description",
        };
        format!(
            "\nWhat would you like to do?\n  \
             {y}  {accept}\n  \
             {r}  Generate a new one\n  \
             {e}  Add context\n  \
             {c}  Cancel\n",
            y = "[y]".bold(),
            r = "[r]".bold(),
            e = "[e]".bold(),
            c = "[c]".bold(),
        )
    }
}

impl Interaction for Terminal {
    fn present(&mut self, result: &GenerationResult) -> Result<()> {
        match result {
            GenerationResult::Commit { message } => {
                println!("\n✨ Suggested commit message:\n");
                println!("   {}", render_headline(message));
            }
            GenerationResult::PullRequest { title, description } => {
                println!("\n📝 PR title:\n");
                println!("   {}\n", render_headline(title));
                println!("📄 PR description:\n");
                println!("{description}");
            }
        }
        Ok(())
    }

    fn choose(&mut self) -> Result<String> {
        print!("{}", self.menu());
        io::stdout().flush()?;

        if io::stdin().is_tty() {
            let key = read_key()?;
            println!();
            Ok(key)
        } else {
            prompt_input("> ")
        }
    }

    fn ask_context(&mut self) -> Result<String> {
        prompt_input("📝 Enter additional context for the next generation:\n> ")
    }

    fn notify(&mut self, notice: Notice) -> Result<()> {
        match notice {
            Notice::NoChanges => match self.mode {
                Mode::Commit => println!("{}", "🚫 No staged changes found.".yellow()),
                Mode::PullRequest => println!("{}", "⚠️  No changes to create a PR from.".yellow()),
            },
            Notice::Regenerating => println!("🔄 Generating a new {}...", self.mode.as_str()),
            Notice::InvalidOption => {
                println!("{}", "⚠️  Invalid option. Please try again.".yellow())
            }
            Notice::Accepted => match self.mode {
                Mode::Commit => println!("{}", "✨ Commit created successfully!".green()),
                Mode::PullRequest => {}
            },
            Notice::Cancelled => println!("{}", "❌ Operation cancelled".red()),
        }
        Ok(())
    }
}

/// Read one keypress in raw mode and map it to menu input.
fn read_key() -> Result<String> {
    terminal::enable_raw_mode()?;
    let key = wait_for_key();
    terminal::disable_raw_mode()?;
    key
}

fn wait_for_key() -> Result<String> {
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let input = match key.code {
            // Raw mode swallows SIGINT.
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => "c".to_string(),
            KeyCode::Char(ch) => ch.to_string(),
            KeyCode::Esc => "c".to_string(),
            KeyCode::Enter => String::new(),
            other => format!("{other:?}"),
        };
        return Ok(input);
    }
}

/// Prints the accepted PR title and description as plain text for copying.
pub struct DescriptionPrinter;

impl ResultConsumer for DescriptionPrinter {
    fn consume(&mut self, result: &GenerationResult) -> Result<()> {
        match result {
            GenerationResult::PullRequest { title, description } => {
                println!("\n----- PR Title -----");
                println!("{title}");
                println!("----- PR Description -----");
                println!("{description}");
                println!("--------------------------");
            }
            GenerationResult::Commit { message } => {
                println!("\n----- Commit Message -----");
                println!("{message}");
                println!("--------------------------");
            }
        }
        Ok(())
    }
}

/// Shows a spinner while the wrapped client works.
pub struct Spinning<'a> {
    inner: &'a dyn LlmClient,
}

impl<'a> Spinning<'a> {
    pub fn new(inner: &'a dyn LlmClient) -> Self {
        Spinning { inner }
    }
}

impl LlmClient for Spinning<'_> {
    fn generate(&self, prompt: &str, mode: Mode) -> Result<GenerationResult, GenerationError> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("🤖 Analyzing changes and writing the {}...", mode.as_str()));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self.inner.generate(prompt, mode);

        // Errors are reported once, by whoever ends the session.
        spinner.finish_and_clear();
        result
    }
}
