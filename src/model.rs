// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Portfolio data model

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The single editable identity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub bio: String,
    pub avatar: ImageRef,
}

/// One portfolio entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: ImageRef,
}

impl Project {
    /// Create a project with a freshly generated id
    pub fn new(title: impl Into<String>, description: impl Into<String>, image: ImageRef) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            image,
        }
    }
}

/// Reference to image bytes: a remote locator or an embedded encoded blob.
///
/// The textual form is either the URL or a `data:` URL, and that is also how
/// it serializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageRef {
    Remote(String),
    Embedded(EncodedImage),
}

/// Base64 payload plus the media type it was read with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// May be empty when the source did not say
    pub media_type: String,
    /// Standard base64
    pub payload: String,
}

impl EncodedImage {
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            media_type: media_type.into(),
            payload: general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn decode(&self) -> std::result::Result<Vec<u8>, base64::DecodeError> {
        general_purpose::STANDARD.decode(&self.payload)
    }
}

impl ImageRef {
    /// Parse the textual form. Anything that is not a base64 data URL is
    /// treated as a remote locator; reachability is not checked.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix("data:") {
            if let Some((header, payload)) = rest.split_once(',') {
                if let Some(media_type) = header.strip_suffix(";base64") {
                    // Drop parameters such as `;charset=...`
                    let media_type = media_type.split(';').next().unwrap_or_default();
                    return Self::Embedded(EncodedImage {
                        media_type: media_type.to_string(),
                        payload: payload.to_string(),
                    });
                }
            }
        }
        Self::Remote(s.to_string())
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Remote(url) => url.is_empty(),
            Self::Embedded(image) => image.payload.is_empty(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => f.write_str(url),
            Self::Embedded(image) => {
                write!(f, "data:{};base64,{}", image.media_type, image.payload)
            }
        }
    }
}

impl From<String> for ImageRef {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ImageRef> for String {
    fn from(image: ImageRef) -> Self {
        image.to_string()
    }
}
