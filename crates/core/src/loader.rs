//! Image loading and payload encoding.
//!
//! This module turns a user-selected file into a self-contained, text-safe
//! payload for the caption engine: a `data:<mime>;base64,<data>` string that
//! embeds its own MIME type, so the image travels as plain text.
//!
//! # Progress
//!
//! Reads happen in fixed-size chunks so the caller can display an upload bar.
//! The percentage is derived from bytes-read over the file length; when the
//! length is unknowable no progress is emitted and the caller should show an
//! indeterminate state.

use crate::error::{AppError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Advertised upload ceiling. Deliberately not hard-enforced: oversized files
/// pass through with a warning, matching the advertised-only product policy.
pub const SOFT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

const READ_CHUNK_BYTES: usize = 64 * 1024;

/// An embeddable, self-describing image blob.
///
/// Immutable once produced; a new upload always creates a new instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePayload {
    encoded_data: String,
    mime_type: String,
    size_bytes: u64,
}

impl ImagePayload {
    /// Builds a payload from raw image bytes and their MIME type.
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        let encoded = BASE64.encode(bytes);
        Self {
            encoded_data: format!("data:{mime_type};base64,{encoded}"),
            mime_type: mime_type.to_string(),
            size_bytes: bytes.len() as u64,
        }
    }

    /// The full `data:<mime>;base64,<payload>` string.
    pub fn data_uri(&self) -> &str {
        &self.encoded_data
    }

    /// MIME type of the underlying image.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size of the original (un-encoded) file.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// The base64 portion of the data URI, without the scheme prefix.
    pub fn base64_data(&self) -> &str {
        self.encoded_data
            .split_once(',')
            .map(|(_, data)| data)
            .unwrap_or("")
    }

    /// Whether the file exceeded the advertised upload ceiling.
    pub fn exceeds_soft_limit(&self) -> bool {
        self.size_bytes > SOFT_MAX_UPLOAD_BYTES
    }
}

/// Reads user-selected files into [`ImagePayload`]s.
pub struct ImageLoader;

impl ImageLoader {
    /// Loads an image file, emitting progress callbacks as it reads.
    ///
    /// The declared content type (from the file extension) must be an image
    /// type; anything else fails with [`AppError::InvalidFileType`] before a
    /// single byte is read. After the read, the MIME is refined by sniffing
    /// the actual bytes, since extensions lie more often than magic numbers.
    ///
    /// `on_progress` receives percentages in `[0, 100]`; the final call is
    /// always 100 once the read completes. Files with an unknowable length
    /// emit no progress at all.
    pub async fn load(path: &Path, mut on_progress: impl FnMut(u8)) -> Result<ImagePayload> {
        let declared_mime = declared_mime_type(path).ok_or_else(|| {
            AppError::InvalidFileType(path.display().to_string())
        })?;

        let mut file = File::open(path).await?;
        let total_bytes = file.metadata().await?.len();

        if total_bytes > SOFT_MAX_UPLOAD_BYTES {
            tracing::warn!(
                size_bytes = total_bytes,
                limit_bytes = SOFT_MAX_UPLOAD_BYTES,
                "file exceeds the advertised 5 MB maximum, proceeding anyway"
            );
        }

        let mut bytes = Vec::with_capacity(total_bytes as usize);
        let mut chunk = vec![0u8; READ_CHUNK_BYTES];
        loop {
            let read = file.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            bytes.extend_from_slice(&chunk[..read]);
            if total_bytes > 0 {
                let pct = (bytes.len() as u64 * 100 / total_bytes).min(100) as u8;
                on_progress(pct);
            }
        }
        if total_bytes > 0 {
            on_progress(100);
        }

        // Prefer the sniffed format when the bytes are recognizable.
        let mime = image::guess_format(&bytes)
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or(declared_mime);

        Ok(ImagePayload::from_bytes(&bytes, &mime))
    }
}

/// MIME type implied by the file extension, `None` for non-image extensions.
fn declared_mime_type(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(mime.to_string())
}
