use super::{GenerationResult, LlmClient, Mode, decode};
use crate::config::Config;
use crate::error::GenerationError;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ERROR_DETAIL_CHARS: usize = 200;

/// Minimal request/response structs for an OpenAI-compatible Chat Completions API.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Chat Completions implementation of LlmClient.
pub struct OpenAiClient {
    client: Client,
    api_token: String,
    model: String,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        Self::with_endpoint(
            cfg.endpoint(),
            cfg.api_token.clone(),
            cfg.model.clone(),
            cfg.timeout,
        )
    }

    pub fn with_endpoint(
        endpoint: String,
        api_token: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(OpenAiClient {
            client,
            api_token,
            model,
            endpoint,
        })
    }

    /// Send the prompt and return the raw content of the first choice.
    fn call_chat(&self, prompt: &str) -> Result<String, GenerationError> {
        let req = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        log::info!("Calling model {:?} at {}", self.model, self.endpoint);
        log::trace!("Prompt:\n{}", truncate(prompt, 4000));

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&req)
            .send()
            .map_err(GenerationError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown Status").to_string();
            let body = resp.text().unwrap_or_default();
            log::debug!("Error body: {}", truncate(&body, 2000));
            return Err(GenerationError::Api {
                status: status.as_u16(),
                reason,
                detail: error_detail(&body),
            });
        }

        let body = resp.text().map_err(GenerationError::Transport)?;
        log::debug!("Raw response: {}", truncate(&body, 4000));

        let chat_resp: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            GenerationError::malformed(format!("unexpected response envelope: {e}"))
        })?;

        if let Some(usage) = &chat_resp.usage {
            log::info!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        chat_resp
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GenerationError::malformed("no choices returned"))
    }
}

impl LlmClient for OpenAiClient {
    fn generate(&self, prompt: &str, mode: Mode) -> Result<GenerationResult, GenerationError> {
        let content = self.call_chat(prompt)?;
        decode::decode(&content, mode)
    }
}

/// One line of the error body, kept as text; it is never decoded.
fn error_detail(body: &str) -> String {
    let line = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.chars().count() <= ERROR_DETAIL_CHARS {
        return line;
    }
    let mut cut: String = line.chars().take(ERROR_DETAIL_CHARS).collect();
    cut.push_str("...");
    cut
}

/// Truncate long strings for debug logging.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut cut = max_len;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...\n[truncated {} chars]", &s[..cut], s.len() - cut)
}
