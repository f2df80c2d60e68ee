//! File metadata and upload attachments.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt};

use tb_core::constants::VOICE_EXTENSIONS;
use tb_core::error::{BotError, BotResult};

/// File metadata from `/files/getInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    #[serde(default)]
    pub file_id: String,
    #[serde(rename = "type", default)]
    pub file_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub url: String,
}

/// A named byte payload to upload with exactly one request.
///
/// The content is fully buffered; the dispatcher takes ownership and
/// consumes it into the multipart body.
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    name: String,
    bytes: Vec<u8>,
}

impl FileUpload {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, naming the upload after the file.
    pub async fn from_path(path: impl AsRef<Path>) -> BotResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| BotError::Usage(format!("not a file path: {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self { name, bytes })
    }

    /// Drain any async reader into an upload.
    pub async fn from_reader<R>(name: impl Into<String>, mut reader: R) -> BotResult<Self>
    where
        R: AsyncRead + Unpin,
    {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        Ok(Self {
            name: name.into(),
            bytes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.name, self.bytes)
    }

    /// Lowercased file extension, without the dot.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// Whether the API would accept this upload as a voice message.
    pub fn is_voice(&self) -> bool {
        self.extension()
            .map(|ext| VOICE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUpload")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}
