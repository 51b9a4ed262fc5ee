// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for NeonFolio

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// AI engine configuration
    #[serde(default)]
    pub ai_engine: EngineConfig,

    /// Prompt templates
    #[serde(default)]
    pub prompts: PromptConfig,

    /// Web UI settings
    #[serde(default)]
    pub web: WebConfig,

    /// Starting data
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EngineConfig {
    /// Base URL of the generative language API
    #[serde(default = "default_engine_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout. Unset means the HTTP client's own default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptConfig {
    /// minijinja template; receives `title` and `max_words`
    #[serde(default = "default_description_prompt")]
    pub description: String,
    #[serde(default = "default_max_words")]
    pub max_words: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// Largest accepted request body, uploads included
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Shown in place of images that fail to load
    #[serde(default = "default_image_fallback_url")]
    pub image_fallback_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SeedConfig {
    /// JSON file with `profile` and `projects`; the built-in seed is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// Default value functions
fn default_engine_url() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_model() -> String { "gemini-3-flash-preview".to_string() }
fn default_api_key_env() -> String { "API_KEY".to_string() }
fn default_max_words() -> u32 { 60 }
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_web_port() -> u16 { 8080 }
fn default_max_upload_bytes() -> usize { 10 * 1024 * 1024 }

fn default_image_fallback_url() -> String {
    "https://placehold.co/800x600/111/ccff00?text=Image+Not+Found".to_string()
}

fn default_description_prompt() -> String {
    "You are a creative copywriter for a portfolio website.\n\
     Write a short, engaging, and professional description (max {{ max_words }} words) \
     for a project titled \"{{ title }}\".\n\
     Base the description on the visual details provided in the image.\n\
     Focus on the design, features, or potential tech stack visible.".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: default_engine_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: None,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            description: default_description_prompt(),
            max_words: default_max_words(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            max_upload_bytes: default_max_upload_bytes(),
            image_fallback_url: default_image_fallback_url(),
        }
    }
}

impl EngineConfig {
    /// Read the API key from the configured variable, then `GEMINI_API_KEY`
    pub fn api_key(&self) -> Option<String> {
        [self.api_key_env.as_str(), "GEMINI_API_KEY"]
            .into_iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|key| !key.trim().is_empty())
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::NeonfolioError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
