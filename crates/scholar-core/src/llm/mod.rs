//! Chat-completion backends.

pub mod openai;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

pub use openai::OpenAiCompatible;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed completion response: {0}")]
    Decode(String),
    #[error("completion response contained no message")]
    EmptyResponse,
}

/// A single-message completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub prompt: String,
    /// Ask the service for a JSON object response.
    pub json_mode: bool,
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn text(prompt: String) -> Self {
        Self {
            prompt,
            json_mode: false,
            temperature: None,
        }
    }

    pub fn json(prompt: String) -> Self {
        Self {
            prompt,
            json_mode: true,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Boxed future returned by [`ChatModel::complete`].
pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;

/// A chat-completion service.
pub trait ChatModel: Send + Sync {
    /// Model identifier sent with every request.
    fn model(&self) -> &str;

    /// Send one user message and return the generated text.
    fn complete<'a>(&'a self, request: &'a ChatRequest) -> ChatFuture<'a>;
}
