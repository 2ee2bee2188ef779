//! Language-model oracle boundary.
//!
//! The trait contract is deliberately infallible: implementations mask
//! every transport and decode failure into a fallback utterance, so no
//! oracle problem ever surfaces to the dialogue layer as an error.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use maitred_core::config::LlmConfig;
use maitred_core::dialogue::{reservation_tools, OracleReply, ToolCall, Turn};
use maitred_core::errors::OracleError;

/// Safe utterance returned when the oracle itself is unreachable or
/// unintelligible.
pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble processing your request. Please try again.";

#[async_trait]
pub trait LlmOracle: Send + Sync {
    /// Produce the next assistant reply for the given transcript. Never
    /// fails; see [`FALLBACK_REPLY`].
    async fn reply(&self, transcript: &[Turn]) -> OracleReply;
}

/// OpenAI-compatible chat-completions client. Works against OpenAI itself
/// and anything speaking the same dialect (Ollama, LM Studio, vLLM).
pub struct OpenAiChatOracle {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
}

impl OpenAiChatOracle {
    pub fn new(config: &LlmConfig) -> Result<Self, OracleError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|error| OracleError::Transport(error.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    async fn complete(&self, transcript: &[Turn]) -> Result<OracleReply, OracleError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: transcript,
            tools: reservation_tools(),
            tool_choice: "auto",
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|error| OracleError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(OracleError::Transport(format!("status {status}: {detail}")));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|error| OracleError::Decode(error.to_string()))?;

        let choice = completion.choices.into_iter().next().ok_or(OracleError::EmptyResponse)?;
        Ok(into_oracle_reply(choice.message))
    }
}

#[async_trait]
impl LlmOracle for OpenAiChatOracle {
    async fn reply(&self, transcript: &[Turn]) -> OracleReply {
        match self.complete(transcript).await {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(
                    event_name = "oracle.request_failed",
                    error = %error,
                    "masking oracle failure with fallback reply"
                );
                OracleReply::Text(FALLBACK_REPLY.to_string())
            }
        }
    }
}

/// Only the first tool call of a response is considered.
fn into_oracle_reply(message: CompletionMessage) -> OracleReply {
    let first_call = message.tool_calls.into_iter().flatten().next();
    match first_call {
        Some(call) => OracleReply::ToolCall {
            content: message.content,
            call: ToolCall { name: call.function.name, arguments: call.function.arguments },
        },
        None => OracleReply::Text(message.content.unwrap_or_default()),
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    tools: serde_json::Value,
    tool_choice: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<CompletionToolCall>>,
}

#[derive(Deserialize)]
struct CompletionToolCall {
    function: CompletionFunction,
}

#[derive(Deserialize)]
struct CompletionFunction {
    name: String,
    arguments: String,
}
