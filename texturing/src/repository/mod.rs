//! Lookup collaborators for identifier-based submissions.
//!
//! Repositories hand over owned byte buffers. `Ok(None)` means the
//! identifier does not exist; `Err` is a backend failure.

mod memory;

pub use memory::InMemoryRepository;

use crate::errors::TexturingResult;
use async_trait::async_trait;

/// Top and side texture payloads for one texture date.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextureBytes {
    /// Top-surface texture.
    pub top: Vec<u8>,
    /// Side-surface texture.
    pub side: Vec<u8>,
}

impl TextureBytes {
    /// Creates a new texture pair.
    #[must_use]
    pub fn new(top: Vec<u8>, side: Vec<u8>) -> Self {
        Self { top, side }
    }
}

/// Looks up ship model geometry by ship id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShipModelRepository: Send + Sync {
    /// Returns the model bytes for `ship_id`, or `None` if it does not exist.
    async fn find_ship_model_bytes(&self, ship_id: i64) -> TexturingResult<Option<Vec<u8>>>;
}

/// Looks up texture pairs by date id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextureRepository: Send + Sync {
    /// Returns the textures for `date_id`, or `None` if it does not exist.
    async fn find_texture_bytes(&self, date_id: i64) -> TexturingResult<Option<TextureBytes>>;
}
