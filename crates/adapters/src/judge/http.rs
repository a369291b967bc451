// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Judge backed by an OpenAI-compatible chat-completions endpoint.

use super::{parse_verdict, Judge, JudgeError, JudgeRequest};
use async_trait::async_trait;
use pj_core::{ScaleBounds, ScoreRecord};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Prompt used when no prompt file is configured.
///
/// Placeholders: `{dimensions}`, `{min}`, `{max}`, `{record}`.
pub const DEFAULT_PROMPT: &str = "\
You are scoring an AI agent's answers to a personality questionnaire.
Rate the agent on each of these dimensions: {dimensions}.
Use a scale from {min} to {max}. Use null for a dimension the answers give no signal for.
Reply with a single JSON object and nothing else:
{\"scores\": {\"<dimension>\": <number or null>}, \"evidence\": \"<short quote or reason>\", \
\"confidence\": \"high|medium|low\", \"reverse_scored\": <true if the items are reverse-keyed>}

Questionnaire answers:
{record}
";

/// Longest slice of an error body kept in messages.
const BODY_SNIPPET_LEN: usize = 200;

#[derive(Debug, Clone)]
pub struct HttpJudgeConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub prompt: String,
    pub dimensions: Vec<String>,
    pub scale: ScaleBounds,
    pub temperature: f32,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct HttpJudge {
    client: Client,
    config: HttpJudgeConfig,
}

impl HttpJudge {
    pub fn new(config: HttpJudgeConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn render_prompt(&self, text: &str) -> String {
        self.config
            .prompt
            .replace("{dimensions}", &self.config.dimensions.join(", "))
            .replace("{min}", &self.config.scale.min.to_string())
            .replace("{max}", &self.config.scale.max.to_string())
            .replace("{record}", text)
    }
}

#[async_trait]
impl Judge for HttpJudge {
    async fn score(&self, request: &JudgeRequest) -> Result<ScoreRecord, JudgeError> {
        let body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: self.render_prompt(&request.text),
            }],
        };
        let mut builder = self.client.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(&e, self.config.timeout))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                JudgeError::Timeout(self.config.timeout)
            } else {
                JudgeError::MalformedOutput(format!("unreadable response body: {e}"))
            }
        })?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| JudgeError::MalformedOutput("response has no message content".into()))?;
        parse_verdict(&request.key, &content)
    }
}

fn transport_error(e: &reqwest::Error, timeout: Duration) -> JudgeError {
    if e.is_timeout() {
        JudgeError::Timeout(timeout)
    } else {
        JudgeError::Unreachable(e.to_string())
    }
}

/// Map a non-success status to a judge error.
///
/// Only a request the server understood and refused is the record's fault.
fn status_error(status: StatusCode, body: &str) -> JudgeError {
    let snippet: String = body.trim().chars().take(BODY_SNIPPET_LEN).collect();
    let message = if snippet.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {snippet}")
    };
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            JudgeError::InvalidInput(message)
        }
        _ => JudgeError::Unreachable(message),
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
