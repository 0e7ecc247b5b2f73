pub const COMMIT_PREAMBLE: &str =
    "You are a software architect who helps developers write commit messages.";

pub const COMMIT_INSTRUCTIONS: &str = r#"# Instructions
- The message must use the semantic release format, for example:
  - fix: description
  - feat: description
  - perf: description
- The message must be written in English.
- The message must not exceed 72 characters.

- Respond with a JSON object with the following structure:
  {
    "message": "The commit message in semantic release format"
  }

IMPORTANT: Respond with the JSON object only. Do not add any other text, formatting,
comments, or markdown code fences."#;

pub const PR_PREAMBLE: &str =
    "You are a software architect who helps developers write titles and descriptions for pull requests.";

pub const PR_INSTRUCTIONS: &str = r#"# Instructions
- The title must use the semantic release format, for example:
  - fix: description
  - feat: description
  - perf: description
- The title and description must be written in English.
- The description must follow the provided PR template, keeping its sections.

- Respond with a JSON object with the following structure:
  {
    "title": "The PR title in semantic release format",
    "description": "The complete PR description following the provided template"
  }

IMPORTANT: Respond with the JSON object only. Do not add any other text, formatting,
comments, or markdown code fences."#;

pub const USER_CONTEXT_HEADING: &str = "# Additional context provided by the user:";

pub const DEFAULT_PR_TEMPLATE: &str = r#"## Scope

[Link to the ticket or issue]

## Purpose

[Here describe the Purpose of the pull request. Include background information if necessary]

## Solution Approach

[Here describe the Solution Approach of the pull request. How does this change fulfill the purpose?]

## Learning

[Here describe the research stage. Add links to blog posts, patterns, libraries or addons used to solve this problem.]

## How to test

[Only if your code can't be tested using an automated test. You should explain why your code can't be tested.]"#;
