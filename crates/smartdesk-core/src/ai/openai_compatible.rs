//! OpenAI-compatible backend implementation
//!
//! Talks to any server implementing the `/v1/chat/completions` API with
//! vision support: OpenAI itself, Azure-style gateways, or a local proxy.
//!
//! # Configuration
//!
//! Environment variables (read through [`crate::config::OpenAIConfig`]):
//! - `OPENAI_API_KEY`: API key (required; the backend is disabled without it)
//! - `OPENAI_MODEL`: Model name (default: gpt-4o-mini)
//! - `OPENAI_BASE_URL`: Server URL (default: https://api.openai.com)
//! - `OPENAI_PDF_ENABLED`: Send PDFs as file parts (default: false)

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OpenAIConfig;
use crate::error::{Error, Result};

use super::types::{ChatRequest, UserPart};
use super::AIBackend;

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
    pdf_enabled: bool,
}

impl OpenAICompatibleBackend {
    /// Create a new backend
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            pdf_enabled: false,
        }
    }

    /// Allow PDF uploads to be forwarded as file parts
    pub fn with_pdf(mut self, enabled: bool) -> Self {
        self.pdf_enabled = enabled;
        self
    }

    /// Create from configuration. Returns None without an API key.
    pub fn from_config(config: &OpenAIConfig) -> Option<Self> {
        let api_key = config.api_key.as_deref()?;
        Some(Self::new(&config.base_url, &config.model, api_key).with_pdf(config.pdf_enabled))
    }

    fn build_request(&self, request: &ChatRequest) -> ChatCompletionRequest {
        let content = match request.parts.as_slice() {
            [UserPart::Text(text)] => ChatContent::Text(text.clone()),
            parts => ChatContent::Parts(parts.iter().map(ContentPart::from).collect()),
        };

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: ChatContent::Text(request.system.clone()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content,
                },
            ],
            temperature: Some(request.temperature),
            stream: false,
        }
    }
}

fn data_url(mime_type: &str, data: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(data)
    )
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: ChatContent,
}

/// Chat message content (text or multimodal)
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ChatContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Content part for multimodal messages
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
    #[serde(rename = "file")]
    File { file: FileData },
}

impl From<&UserPart> for ContentPart {
    fn from(part: &UserPart) -> Self {
        match part {
            UserPart::Text(text) => ContentPart::Text { text: text.clone() },
            UserPart::Image { mime_type, data } => ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: data_url(mime_type, data),
                },
            },
            UserPart::File {
                filename,
                mime_type,
                data,
            } => ContentPart::File {
                file: FileData {
                    filename: filename.clone(),
                    file_data: data_url(mime_type, data),
                },
            },
        }
    }
}

/// Image URL for vision requests
#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

/// Inline file for document requests
#[derive(Debug, Serialize)]
struct FileData {
    filename: String,
    file_data: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Chat response message
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let body = self.build_request(request);

        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Extraction(format!("Model request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Extraction(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Extraction(format!("Invalid response from OpenAI API: {}", e)))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        debug!(model = %self.model, chars = content.len(), "OpenAI response received");

        Ok(content)
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(format!("{}/v1/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn supports_pdf(&self) -> bool {
        self.pdf_enabled
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
