// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for NeonFolio

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for NeonFolio operations
pub type Result<T> = std::result::Result<T, NeonfolioError>;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum NeonfolioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("AI service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// A required field was missing before a mutation or a generation request.
///
/// The `Display` text is shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please upload an image first to use AI generation.")]
    MissingImage,

    #[error("Please add a title to help the AI.")]
    MissingTitle,

    #[error("Please fill in all fields.")]
    IncompleteProject,
}

/// An image could not be read. No partial image is kept.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Could not read image {path:?}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read uploaded image: {0}")]
    Upload(String),

    #[error("Could not fetch image {url}: {source}")]
    Remote {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The AI service call failed. The cause is logged, never carried.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Failed to generate description. Check your API key or try again.")]
pub struct GenerationError;
