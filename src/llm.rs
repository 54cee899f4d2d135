//! HTTP client for the corrective-feedback LLM endpoint.
//!
//! Speaks the generateContent JSON shape: the request wraps the prompt in
//! `contents[0].parts[0].text`, the reply carries the generated text in
//! `candidates[0].content.parts[0].text`. The client is blocking; the
//! session driver bridges it onto the async loop with `spawn_blocking`.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Feedback-generation client with fixed connect/read timeouts.
pub struct LlmClient {
    agent: ureq::Agent,
    endpoint: String,
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

impl LlmClient {
    pub fn from_config(config: &LlmConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(Duration::from_secs(config.timeout_secs))
            .build();
        let endpoint = if config.api_key.is_empty() {
            config.endpoint.clone()
        } else {
            format!("{}?key={}", config.endpoint, config.api_key)
        };
        Self { agent, endpoint }
    }

    /// Send the prompt and return the generated feedback text.
    ///
    /// A reply without candidate text counts as a sink failure; the caller
    /// decides whether to keep its window for the next cycle.
    pub fn generate_feedback(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response: GenerateResponse = self
            .agent
            .post(&self.endpoint)
            .send_json(&request)
            .context("feedback request failed")?
            .into_json()
            .context("invalid feedback response body")?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("no feedback text in response"))
    }
}
