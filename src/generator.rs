// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! AI-assisted project descriptions
//!
//! Input is checked locally before anything is sent. A remote image is
//! downloaded first so it can travel inline. A valid request costs exactly
//! one call to the [`DescriptionService`]; there is no retry and no timeout
//! at this layer. Failures reach the caller as a bare
//! [`GenerationError`] and the cause only goes to the log.

use async_trait::async_trait;
use minijinja::{context, Environment};
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::PromptConfig;
use crate::error::{GenerationError, ValidationError};
use crate::ingest::fetch_remote;
use crate::model::ImageRef;
use crate::NeonfolioError;

/// Used when the service answers with no text
pub const EMPTY_DESCRIPTION_PLACEHOLDER: &str = "Could not generate description.";

/// Used when the image carries no media type
pub const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// Image payload as sent to the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineImage<'a> {
    pub media_type: &'a str,
    /// Standard base64
    pub data: &'a str,
}

/// The external multimodal text generator
#[async_trait]
pub trait DescriptionService: Send + Sync {
    /// Returns the generated text, or `None` when the service produced none
    async fn describe(&self, prompt: &str, image: InlineImage<'_>) -> anyhow::Result<Option<String>>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescribeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl From<DescribeError> for NeonfolioError {
    fn from(e: DescribeError) -> Self {
        match e {
            DescribeError::Validation(e) => e.into(),
            DescribeError::Generation(e) => e.into(),
        }
    }
}

/// Builds the prompt and calls the service for one project at a time
#[derive(Clone)]
pub struct DescriptionGenerator {
    service: Arc<dyn DescriptionService>,
    http: Client,
    template: String,
    max_words: u32,
}

impl DescriptionGenerator {
    pub fn new(service: Arc<dyn DescriptionService>, prompts: &PromptConfig) -> Self {
        Self {
            service,
            http: Client::new(),
            template: prompts.description.clone(),
            max_words: prompts.max_words,
        }
    }

    /// Render the instruction text for a title
    pub fn prompt_for(&self, title: &str) -> Result<String, minijinja::Error> {
        Environment::new().render_str(
            &self.template,
            context! { title => title, max_words => self.max_words },
        )
    }

    /// Check the input without contacting anything
    pub fn validate<'a>(
        &self,
        title: &str,
        image: Option<&'a ImageRef>,
    ) -> Result<&'a ImageRef, ValidationError> {
        let image = image.filter(|i| !i.is_empty()).ok_or(ValidationError::MissingImage)?;
        if title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        Ok(image)
    }

    /// Generate a description for `title` from `image`
    pub async fn generate(&self, title: &str, image: Option<&ImageRef>) -> Result<String, DescribeError> {
        let image = self.validate(title, image)?;
        let title = title.trim();

        let fetched;
        let encoded = match image {
            ImageRef::Embedded(encoded) => encoded,
            ImageRef::Remote(url) => {
                fetched = fetch_remote(&self.http, url).await.map_err(|e| {
                    error!("{}", e);
                    GenerationError
                })?;
                &fetched
            }
        };
        let inline = InlineImage {
            media_type: if encoded.media_type.is_empty() {
                DEFAULT_MEDIA_TYPE
            } else {
                &encoded.media_type
            },
            data: &encoded.payload,
        };

        let prompt = self.prompt_for(title).map_err(|e| {
            error!("Failed to render description prompt: {}", e);
            GenerationError
        })?;

        debug!("Requesting description for {:?} ({})", title, inline.media_type);

        match self.service.describe(&prompt, inline).await {
            Ok(text) => {
                let text = text.as_deref().map(str::trim).unwrap_or_default();
                if text.is_empty() {
                    Ok(EMPTY_DESCRIPTION_PLACEHOLDER.to_string())
                } else {
                    Ok(text.to_string())
                }
            }
            Err(e) => {
                error!("Description generation failed: {:#}", e);
                Err(GenerationError.into())
            }
        }
    }
}
