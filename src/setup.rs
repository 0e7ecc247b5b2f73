use anyhow::Result;
use log::debug;
use crate::config::Config;
use crate::llm::LlmClient;
use crate::llm::openai::OpenAiClient;

/// Build the LLM client from the resolved config.
pub fn build_llm_client(cfg: &Config) -> Result<Box<dyn LlmClient>> {
    debug!(
        "Using OpenAiClient with model {} at {} (timeout {:?})",
        cfg.model,
        cfg.endpoint(),
        cfg.timeout
    );

    Ok(Box::new(OpenAiClient::new(cfg)?))
}
