// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Gemini `generateContent` API client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::EngineConfig;
use crate::generator::{DescriptionService, InlineImage};
use crate::{NeonfolioError, Result};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: Blob<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, joined
    fn text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        Some(text)
    }
}

impl GeminiClient {
    /// Create a client from engine settings
    pub fn new(config: &EngineConfig, api_key: Option<String>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.base_url, self.model)
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            NeonfolioError::Config("No API key set for the AI service".to_string())
        })
    }

    /// Check that the model endpoint answers with our key
    pub async fn health_check(&self) -> Result<()> {
        let url = self.model_url();

        let response = self.client
            .get(&url)
            .header(API_KEY_HEADER, self.api_key()?)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| {
                NeonfolioError::ServiceUnavailable(format!(
                    "Cannot connect to {}: {}",
                    self.base_url, e
                ))
            })?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }

    /// Generate text from a prompt and one inline image
    pub async fn generate_with_image(&self, prompt: &str, image: InlineImage<'_>) -> Result<Option<String>> {
        let url = format!("{}:generateContent", self.model_url());

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::InlineData {
                        inline_data: Blob {
                            mime_type: image.media_type,
                            data: image.data,
                        },
                    },
                ],
            }],
        };

        debug!("Sending vision request to Gemini: model={}", self.model);

        let response = self.client
            .post(&url)
            .header(API_KEY_HEADER, self.api_key()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let result: GenerateContentResponse = response.json().await?;
        Ok(result.text())
    }
}

async fn status_error(response: reqwest::Response) -> NeonfolioError {
    let status = response.status();
    let message = response
        .json::<ErrorResponse>()
        .await
        .map(|e| e.error.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            NeonfolioError::Config(format!("AI service rejected the API key: {}", message))
        }
        _ => NeonfolioError::ServiceUnavailable(format!(
            "AI service returned status {}: {}",
            status, message
        )),
    }
}

#[async_trait]
impl DescriptionService for GeminiClient {
    async fn describe(&self, prompt: &str, image: InlineImage<'_>) -> anyhow::Result<Option<String>> {
        Ok(self.generate_with_image(prompt, image).await?)
    }
}
