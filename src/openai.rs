//! Utilities for querying the OpenAI API via the completions and chat completions endpoints.
//!
//! For specific details on request/response schemas, see the [OpenAI API chat completions docs](https://platform.openai.com/docs/api-reference/chat/create).

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::{Endpoint, Model};
use crate::config::Settings;
use crate::context::assemble_messages;
use crate::errors::AskError;
use crate::response::ApiResponse;

/// Author of a `chat/completions` message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A `chat/completions` `messages` item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        ChatMessage {
            role,
            content: content.into(),
        }
    }
}

/// A `chat/completions` request body
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: String,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A legacy `completions` request body
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: String,
    pub prompt: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Anything that can answer a prompt given the recent conversation.
pub trait Completer {
    fn complete(&self, prompt: &str, past: Vec<ChatMessage>) -> Result<ApiResponse, AskError>;
}

/// Blocking client for the OpenAI HTTP API
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    api_base: String,
    model: Model,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

impl OpenAiClient {
    pub fn new(settings: &Settings) -> Result<Self, AskError> {
        Ok(OpenAiClient {
            http: reqwest::blocking::Client::new(),
            api_key: settings.require_api_key()?.to_string(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            model: settings.model,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            system_prompt: settings.system_prompt.clone(),
        })
    }

    fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<ApiResponse, AskError> {
        let url = format!("{}/{}", self.api_base, path);
        debug!(%url, model = %self.model, "sending request");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(AskError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json()?)
    }
}

impl Completer for OpenAiClient {
    fn complete(&self, prompt: &str, past: Vec<ChatMessage>) -> Result<ApiResponse, AskError> {
        match self.model.endpoint() {
            Endpoint::Chat => {
                let messages = assemble_messages(past, prompt, &self.system_prompt);
                debug!(messages = messages.len(), "chat request");
                let req_body = ChatRequest {
                    model: self.model.to_string(),
                    messages: &messages,
                    temperature: self.temperature,
                    max_tokens: self.max_tokens,
                };
                self.post("chat/completions", &req_body)
            }
            // completion models have no notion of turns, they only see the prompt
            Endpoint::Completions => {
                let req_body = CompletionRequest {
                    model: self.model.to_string(),
                    prompt,
                    temperature: self.temperature,
                    max_tokens: self.max_tokens,
                };
                self.post("completions", &req_body)
            }
        }
    }
}
