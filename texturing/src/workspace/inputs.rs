//! Input payloads for a render job.

use crate::repository::TextureBytes;

/// Workspace file name for model geometry fetched by identifier.
pub const DEFAULT_MODEL_FILE: &str = "model.ply";

/// Workspace file name for the top texture fetched by identifier.
pub const DEFAULT_TOP_TEXTURE_FILE: &str = "texture_top.jpg";

/// Workspace file name for the side texture fetched by identifier.
pub const DEFAULT_SIDE_TEXTURE_FILE: &str = "texture_side.jpg";

/// A single input payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Name to preserve in the workspace. `None` means use the default name.
    pub file_name: Option<String>,
    /// The payload.
    pub bytes: Vec<u8>,
}

impl InputFile {
    /// Creates an input that takes the default workspace name.
    #[must_use]
    pub fn unnamed(bytes: Vec<u8>) -> Self {
        Self {
            file_name: None,
            bytes,
        }
    }

    /// Creates an input that keeps the given name.
    #[must_use]
    pub fn named(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            bytes,
        }
    }

    /// Returns the payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A file handed over by an upload collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// The client-supplied file name.
    pub original_name: String,
    /// The file contents.
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Creates a new uploaded file.
    #[must_use]
    pub fn new(original_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            bytes,
        }
    }
}

impl From<UploadedFile> for InputFile {
    fn from(upload: UploadedFile) -> Self {
        Self::named(upload.original_name, upload.bytes)
    }
}

/// The three payloads a job consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInputs {
    /// Model geometry.
    pub model: InputFile,
    /// Top-surface texture.
    pub top_texture: InputFile,
    /// Side-surface texture.
    pub side_texture: InputFile,
}

impl JobInputs {
    /// Builds inputs from identifier lookups. Files take their default names.
    #[must_use]
    pub fn from_lookup(model: Vec<u8>, textures: TextureBytes) -> Self {
        Self {
            model: InputFile::unnamed(model),
            top_texture: InputFile::unnamed(textures.top),
            side_texture: InputFile::unnamed(textures.side),
        }
    }

    /// Builds inputs from uploads. Files keep their original names.
    #[must_use]
    pub fn from_uploads(model: UploadedFile, top: UploadedFile, side: UploadedFile) -> Self {
        Self {
            model: model.into(),
            top_texture: top.into(),
            side_texture: side.into(),
        }
    }

    /// Returns the combined payload size in bytes.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.model.len() + self.top_texture.len() + self.side_texture.len()
    }
}
