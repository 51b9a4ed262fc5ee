// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Image ingestion: file, upload or remote bytes to an embedded image

use image::ImageFormat;
use reqwest::{header::CONTENT_TYPE, Client};
use std::path::Path;
use tracing::debug;

use crate::error::ReadError;
use crate::model::{EncodedImage, ImageRef};

const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Read a whole file and embed it. Fails without a partial result.
pub async fn ingest_file(path: &Path) -> Result<ImageRef, ReadError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ReadError::File {
        path: path.to_path_buf(),
        source,
    })?;

    let file_name = path.file_name().and_then(|n| n.to_str());
    Ok(ingest_bytes(&bytes, None, file_name))
}

/// Embed bytes that are already in memory, e.g. a multipart upload
pub fn ingest_bytes(bytes: &[u8], declared_type: Option<&str>, file_name: Option<&str>) -> ImageRef {
    ImageRef::Embedded(encode(bytes, declared_type, file_name))
}

/// Download a remote image so its bytes can be sent inline
pub async fn fetch_remote(client: &Client, url: &str) -> Result<EncodedImage, ReadError> {
    let remote_error = |source: reqwest::Error| ReadError::Remote {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(remote_error)?;

    let declared_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let file_name = response
        .url()
        .path_segments()
        .and_then(|segments| segments.last())
        .map(str::to_string);

    let bytes = response.bytes().await.map_err(remote_error)?;
    Ok(encode(&bytes, declared_type.as_deref(), file_name.as_deref()))
}

fn encode(bytes: &[u8], declared_type: Option<&str>, file_name: Option<&str>) -> EncodedImage {
    let media_type = media_type_for(bytes, declared_type, file_name);
    debug!("Ingested {} bytes as {}", bytes.len(), media_type);
    EncodedImage::from_bytes(media_type, bytes)
}

/// Declared type, then file extension, then magic bytes
pub fn media_type_for(bytes: &[u8], declared_type: Option<&str>, file_name: Option<&str>) -> String {
    if let Some(declared) = declared_type.map(str::trim) {
        if !declared.is_empty() && !declared.eq_ignore_ascii_case(UNKNOWN_MEDIA_TYPE) {
            return declared.to_ascii_lowercase();
        }
    }

    let from_extension = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .and_then(media_type_for_extension);
    if let Some(media_type) = from_extension {
        return media_type.to_string();
    }

    image::guess_format(bytes)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| UNKNOWN_MEDIA_TYPE.to_string())
}

fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    if ext.eq_ignore_ascii_case("svg") {
        return Some("image/svg+xml");
    }
    ImageFormat::from_extension(ext).map(|format| format.to_mime_type())
}
