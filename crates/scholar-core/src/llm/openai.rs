//! OpenAI-compatible `/chat/completions` client (DeepSeek by default).

use serde::{Deserialize, Serialize};

use super::{ChatFuture, ChatModel, ChatRequest, LlmError};

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

#[derive(Clone)]
pub struct OpenAiCompatible {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatible")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiCompatible {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            api_key,
            base_url,
            model,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

fn build_body<'a>(model: &'a str, request: &'a ChatRequest) -> CompletionBody<'a> {
    CompletionBody {
        model,
        messages: vec![Message {
            role: "user",
            content: &request.prompt,
        }],
        response_format: request.json_mode.then_some(ResponseFormat {
            kind: "json_object",
        }),
        temperature: request.temperature,
    }
}

fn content_from_body(body: &str) -> Result<String, LlmError> {
    let parsed: CompletionResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Decode(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(LlmError::EmptyResponse)
}

impl ChatModel for OpenAiCompatible {
    fn model(&self) -> &str {
        &self.model
    }

    fn complete<'a>(&'a self, request: &'a ChatRequest) -> ChatFuture<'a> {
        Box::pin(async move {
            tracing::debug!(
                model = %self.model,
                prompt_chars = request.prompt.chars().count(),
                json_mode = request.json_mode,
                "sending completion request"
            );

            let resp = self
                .client
                .post(self.url())
                .bearer_auth(&self.api_key)
                .json(&build_body(&self.model, request))
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp
                    .text()
                    .await
                    .unwrap_or_else(|_| "<body unavailable>".to_string());
                return Err(LlmError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let body = resp.text().await?;
            content_from_body(&body)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_mode_sets_response_format() {
        let req = ChatRequest::json("extract".into());
        let body = serde_json::to_value(build_body(DEFAULT_MODEL, &req)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "deepseek-chat",
                "messages": [{"role": "user", "content": "extract"}],
                "response_format": {"type": "json_object"}
            })
        );
    }

    #[test]
    fn text_mode_with_temperature() {
        let req = ChatRequest::text("write".into()).with_temperature(0.5);
        let body = serde_json::to_value(build_body("m", &req)).unwrap();
        assert!(body.get("response_format").is_none());
        assert_eq!(body["temperature"], serde_json::json!(0.5));
    }

    #[test]
    fn first_choice_content_returned() {
        let body = r##"{"choices":[{"index":0,"message":{"role":"assistant","content":"# Report"}}]}"##;
        assert_eq!(content_from_body(body).unwrap(), "# Report");
    }

    #[test]
    fn no_choices_is_empty_response() {
        let err = content_from_body(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[test]
    fn null_content_is_empty_response() {
        let err =
            content_from_body(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[test]
    fn url_trims_trailing_slash() {
        let client = OpenAiCompatible::new(
            "sk".into(),
            "https://api.deepseek.com/".into(),
            DEFAULT_MODEL.into(),
        );
        assert_eq!(client.url(), "https://api.deepseek.com/chat/completions");
    }
}
