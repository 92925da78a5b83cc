//! OpenAI-compatible provider implementations.
//!
//! Works against the OpenAI API itself or any server exposing the same
//! surface (vLLM, Ollama, LocalAI); the base URL is configuration.

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};

use crate::artifact::ImagePayload;
use crate::provider::{ImageProvider, ProviderError, TextProvider};

/// Shared connection settings for both providers.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Bearer token; optional for local servers.
    pub api_key: Option<String>,
}

fn build_client() -> Result<Client, ProviderError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| ProviderError::Failed(e.to_string()))
}

fn apply_auth(request: reqwest::RequestBuilder, api_key: Option<&str>) -> reqwest::RequestBuilder {
    match api_key {
        Some(key) => request.header(header::AUTHORIZATION, format!("Bearer {key}")),
        None => request,
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status.as_u16() == 429 {
        return Err(ProviderError::RateLimited);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Failed(format!("HTTP {status}: {body}")))
}

/// Chat-completions text provider.
pub struct OpenAiTextProvider {
    client: Client,
    config: ProviderConfig,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiTextProvider {
    /// Creates a provider for the given endpoint and model.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Failed` if the HTTP client cannot be built.
    pub fn new(config: ProviderConfig, model: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client()?,
            config,
            model: model.into(),
        })
    }
}

#[async_trait]
impl TextProvider for OpenAiTextProvider {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            stream: false,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let request = apply_auth(self.client.post(&url), self.config.api_key.as_deref());
        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let parsed: ChatResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Failed(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(content)
    }
}

/// Image-generations provider.
pub struct OpenAiImageProvider {
    client: Client,
    config: ProviderConfig,
    model: String,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    response_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

impl OpenAiImageProvider {
    /// Creates a provider for the given endpoint and model.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Failed` if the HTTP client cannot be built.
    pub fn new(config: ProviderConfig, model: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client()?,
            config,
            model: model.into(),
        })
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    async fn render(&self, prompt: &str) -> Result<ImagePayload, ProviderError> {
        let body = ImageRequest {
            model: &self.model,
            prompt,
            n: 1,
            response_format: "b64_json",
        };

        let url = format!("{}/images/generations", self.config.base_url);
        let request = apply_auth(self.client.post(&url), self.config.api_key.as_deref());
        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let parsed: ImageResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Failed(e.to_string()))?;

        let base64 = parsed
            .data
            .into_iter()
            .next()
            .and_then(|datum| datum.b64_json)
            .ok_or(ProviderError::Empty)?;

        Ok(ImagePayload {
            media_type: "image/png".into(),
            base64,
        })
    }
}
