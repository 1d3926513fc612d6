//! The API mediator: maps a [`TaskRequest`] to one outbound HTTP call and
//! back to a [`TaskResult`]. Each call is a single stateless round trip;
//! nothing is held open between calls.

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::config::Config;
use crate::task::{TaskOutput, TaskRequest, TaskResult};

/// Payload used when a chat completion comes back without content.
const NO_RESPONSE: &str = "No response";

/// Per-request ceiling; a hung endpoint terminates in a transport failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Internal error classes for one dispatch. Every variant carries the
/// attempted URL; none carries a key. Converted into
/// [`TaskResult::Failure`] at the `execute` boundary and never propagated
/// past it.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}: {body}")]
    HttpStatus {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl DispatchError {
    fn attempted_url(&self) -> &str {
        match self {
            DispatchError::Transport { url, .. }
            | DispatchError::HttpStatus { url, .. }
            | DispatchError::Decode { url, .. } => url,
        }
    }
}

// The trait exists so front-ends can depend on the contract rather than
// on the concrete client, and swap in a `mockall` mock in tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Mediator {
    /// Executes one task round trip. Always terminates in a `TaskResult`;
    /// transport faults, bad statuses, and undecodable bodies all come
    /// back as the `Failure` variant.
    async fn execute(&self, request: TaskRequest) -> TaskResult;
}

/// Production mediator talking to the three Azure OpenAI REST endpoints.
pub struct AzureMediator {
    client: Client,
    config: Config,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: ChatMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Default, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    embedding: Vec<f32>,
}

impl AzureMediator {
    pub fn new(config: Config) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn dispatch_chat(&self, prompt: &str) -> Result<TaskOutput, DispatchError> {
        let url = &self.config.chat.url;
        let body = serde_json::json!({
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.7,
            "max_tokens": 800
        });

        tracing::debug!(endpoint = %url, prompt_chars = prompt.len(), "sending chat completion request");

        let response = self
            .client
            .post(url)
            .timeout(REQUEST_TIMEOUT)
            .header("api-key", self.config.chat.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError::Transport {
                url: url.clone(),
                source: e,
            })?;
        let response = check_status(url, response).await?;

        let completion: ChatCompletion =
            response.json().await.map_err(|e| DispatchError::Decode {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_else(|| NO_RESPONSE.to_string());
        Ok(TaskOutput::Chat(content))
    }

    async fn dispatch_transcription(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
    ) -> Result<TaskOutput, DispatchError> {
        let url = &self.config.speech.url;

        tracing::debug!(
            endpoint = %url,
            bytes = audio.len(),
            declared_mime = %mime_type,
            "sending audio for transcription"
        );

        let response = self
            .client
            .post(url)
            .timeout(REQUEST_TIMEOUT)
            .header(
                "Ocp-Apim-Subscription-Key",
                self.config.speech.api_key.expose_secret(),
            )
            // Content-Type is pinned to audio/wav regardless of the
            // declared upload format.
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(audio)
            .send()
            .await
            .map_err(|e| DispatchError::Transport {
                url: url.clone(),
                source: e,
            })?;
        let response = check_status(url, response).await?;

        // The transcript body is returned verbatim; there is no shape
        // fallback for speech, an unparseable body is a failure.
        let transcript: serde_json::Value =
            response.json().await.map_err(|e| DispatchError::Decode {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        Ok(TaskOutput::Transcript(transcript))
    }

    async fn dispatch_embedding(&self, text: &str) -> Result<TaskOutput, DispatchError> {
        let url = &self.config.embedding.url;
        let body = serde_json::json!({ "input": text });

        tracing::debug!(endpoint = %url, input_chars = text.len(), "sending embedding request");

        let response = self
            .client
            .post(url)
            .timeout(REQUEST_TIMEOUT)
            .header("api-key", self.config.embedding.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError::Transport {
                url: url.clone(),
                source: e,
            })?;
        let response = check_status(url, response).await?;

        let parsed: EmbeddingResponse =
            response.json().await.map_err(|e| DispatchError::Decode {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        // A response without an embedding is benign and yields an empty
        // vector, distinct from transport or HTTP failure.
        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .unwrap_or_default();
        Ok(TaskOutput::Embedding(vector))
    }
}

async fn check_status(
    url: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, DispatchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    Err(DispatchError::HttpStatus {
        url: url.to_string(),
        status,
        body,
    })
}

#[async_trait]
impl Mediator for AzureMediator {
    async fn execute(&self, request: TaskRequest) -> TaskResult {
        let kind = request.kind();
        let outcome = match request {
            TaskRequest::Chat { prompt } => self.dispatch_chat(&prompt).await,
            TaskRequest::Transcription { audio, mime_type } => {
                self.dispatch_transcription(audio, &mime_type).await
            }
            TaskRequest::Embedding { text } => self.dispatch_embedding(&text).await,
        };

        match outcome {
            Ok(output) => TaskResult::Success(output),
            Err(err) => {
                tracing::warn!(task = kind.as_str(), error = %err, "dispatch failed");
                TaskResult::Failure {
                    attempted_url: err.attempted_url().to_string(),
                    message: err.to_string(),
                }
            }
        }
    }
}
