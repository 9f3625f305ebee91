//! OpenAI-compatible vision extractor.
//!
//! Works with OpenAI, OpenRouter, vLLM, and any other service implementing
//! the chat completions API with image inputs.

use super::{ExtractorError, TitleExtractor};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Timeout for api_key_command execution.
const API_KEY_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

const EXTRACTION_PROMPT: &str = "What are the titles of all the board games in this image? \
    Return the titles only, with no other text, separated by line breaks.";

/// Source of API key for authentication.
#[derive(Debug, Clone)]
pub enum ApiKeySource {
    /// No authentication.
    None,
    /// Static API key.
    Static(String),
    /// Shell command that outputs the API key (for rotating tokens).
    Command(String),
}

impl ApiKeySource {
    /// Get the current API key, executing the command if necessary.
    async fn get_key(&self) -> Result<Option<String>, ExtractorError> {
        match self {
            ApiKeySource::None => Ok(None),
            ApiKeySource::Static(key) => Ok(Some(key.clone())),
            ApiKeySource::Command(cmd) => {
                debug!(command = %cmd, "Fetching API key via command");

                let result = tokio::time::timeout(
                    API_KEY_COMMAND_TIMEOUT,
                    Command::new("sh").arg("-c").arg(cmd).output(),
                )
                .await;

                let output = match result {
                    Ok(Ok(output)) => output,
                    Ok(Err(err)) => {
                        warn!(command = %cmd, error = %err, "api_key_command failed to execute");
                        return Err(ExtractorError::Connection(format!(
                            "Failed to execute api_key_command: {}",
                            err
                        )));
                    }
                    Err(_) => {
                        warn!(command = %cmd, "api_key_command timed out");
                        return Err(ExtractorError::Timeout);
                    }
                };

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!(command = %cmd, stderr = %stderr, "api_key_command failed");
                    return Err(ExtractorError::Connection(format!(
                        "api_key_command failed with status {}: {}",
                        output.status, stderr
                    )));
                }

                let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if key.is_empty() {
                    warn!(command = %cmd, "api_key_command returned empty key");
                    return Err(ExtractorError::Connection(
                        "api_key_command returned empty key".to_string(),
                    ));
                }

                Ok(Some(key))
            }
        }
    }
}

/// Vision extractor backed by an OpenAI-compatible chat completions API.
///
/// When a fallback model is configured, a failed extraction with the primary
/// model is retried once on the fallback variant.
pub struct OpenAiVisionExtractor {
    client: Client,
    base_url: String,
    model: String,
    fallback_model: Option<String>,
    api_key_source: ApiKeySource,
    timeout: Duration,
}

impl OpenAiVisionExtractor {
    /// # Arguments
    /// * `base_url` - Base URL of the API (e.g., "https://api.openai.com/v1").
    /// * `model` - Vision-capable model to use.
    /// * `fallback_model` - Optional model variant to retry with once.
    /// * `api_key_source` - How to obtain the API key, if any.
    /// * `timeout_sec` - Request timeout in seconds.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        fallback_model: Option<String>,
        api_key_source: ApiKeySource,
        timeout_sec: u64,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            fallback_model,
            api_key_source,
            timeout: Duration::from_secs(timeout_sec),
        }
    }

    async fn complete(
        &self,
        model: &str,
        image: &[u8],
        mime_type: &str,
    ) -> Result<Vec<String>, ExtractorError> {
        let url = format!("{}/chat/completions", self.base_url);
        let data_url = format!(
            "data:{};base64,{}",
            mime_type,
            base64::engine::general_purpose::STANDARD.encode(image)
        );

        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: EXTRACTION_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            temperature: 0.0,
        };

        debug!(
            model = %model,
            image_bytes = image.len(),
            "Sending extraction request to OpenAI-compatible API"
        );

        let mut req_builder = self.client.post(&url).json(&request);

        if let Some(api_key) = self.api_key_source.get_key().await? {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.timeout(self.timeout).send().await.map_err(|e| {
            if e.is_timeout() {
                ExtractorError::Timeout
            } else {
                ExtractorError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ExtractorError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractorError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            ExtractorError::InvalidResponse(format!("Failed to parse chat response: {}", e))
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ExtractorError::InvalidResponse("No choices in chat response".to_string())
            })?;

        Ok(parse_titles(&content))
    }
}

#[async_trait]
impl TitleExtractor for OpenAiVisionExtractor {
    async fn extract_titles(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<Vec<String>, ExtractorError> {
        match self.complete(&self.model, image, mime_type).await {
            Ok(titles) => {
                debug!(count = titles.len(), "Extracted titles");
                Ok(titles)
            }
            Err(err) => match &self.fallback_model {
                Some(fallback) => {
                    warn!(
                        "Extraction with {} failed ({}), retrying with {}",
                        self.model, err, fallback
                    );
                    self.complete(fallback, image, mime_type).await
                }
                None => Err(err),
            },
        }
    }
}

fn parse_titles(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

// chat completions API types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
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
