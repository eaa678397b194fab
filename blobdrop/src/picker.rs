//! File selection.
//!
//! A selection event carries any number of files; only the first one is kept and an empty
//! selection leaves the current choice alone.

use bytes::Bytes;
use std::path::Path;

use crate::errors::{Error, Result};

/// A picked file held in memory until it is uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Display name, also used as the blob name
    pub name: String,
    /// Declared MIME type, sent as `Content-Type`
    pub content_type: String,
    /// Raw file contents
    pub data: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Read a local file and guess its MIME type from the extension.
    ///
    /// Unknown extensions map to `application/octet-stream`.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::InvalidFileName {
                path: path.display().to_string(),
            })?
            .to_string();

        let data = tokio::fs::read(path).await?;
        let content_type = mime_guess::from_path(path).first_or_octet_stream().essence_str().to_string();

        tracing::debug!(file = %name, content_type = %content_type, size = data.len(), "Read file from disk");

        Ok(Self::new(name, content_type, data))
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Holds the current file selection.
#[derive(Debug, Default)]
pub struct Picker {
    selected: Option<SelectedFile>,
}

impl Picker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a selection event. Returns whether the selection changed.
    pub fn select<I>(&mut self, files: I) -> bool
    where
        I: IntoIterator<Item = SelectedFile>,
    {
        let Some(file) = files.into_iter().next() else {
            return false;
        };

        tracing::debug!(file = %file.name, size = file.size(), "File selected");
        self.selected = Some(file);
        true
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.selected.as_ref().map(|file| file.name.as_str())
    }
}
