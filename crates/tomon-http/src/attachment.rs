//! Image attachment inspection

use std::path::Path;
use tomon_common::{Error, Result};

/// File name and MIME type of an image about to be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: &'static str,
}

impl Attachment {
    /// Extensions the platform accepts for image messages, with their MIME type
    pub const SUPPORTED_TYPES: &'static [(&'static str, &'static str)] =
        &[("jpg", "image/jpeg"), ("png", "image/png")];

    /// Derive the upload name and MIME type from a path
    ///
    /// Only `jpg` and `png` are accepted; anything else is a
    /// [`Error::FileType`].
    pub fn inspect(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or(Error::MissingParameter("file_path"))?
            .to_string();

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let content_type = Self::SUPPORTED_TYPES
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, mime)| *mime)
            .ok_or_else(|| Error::FileType(extension.to_string()))?;

        Ok(Self {
            file_name,
            content_type,
        })
    }

    /// Inspect and read an image from disk
    pub async fn load(path: &Path) -> Result<(Self, Vec<u8>)> {
        let attachment = Self::inspect(path)?;
        let bytes = tokio::fs::read(path).await.map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok((attachment, bytes))
    }
}
