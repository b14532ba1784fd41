//! In-memory repository implementation.

use super::{ShipModelRepository, TextureBytes, TextureRepository};
use crate::errors::TexturingResult;
use async_trait::async_trait;
use dashmap::DashMap;

/// Thread-safe in-memory store of ship models and texture pairs.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    models: DashMap<i64, Vec<u8>>,
    textures: DashMap<i64, TextureBytes>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a ship model.
    pub fn insert_model(&self, ship_id: i64, bytes: Vec<u8>) {
        self.models.insert(ship_id, bytes);
    }

    /// Stores a texture pair.
    pub fn insert_textures(&self, date_id: i64, textures: TextureBytes) {
        self.textures.insert(date_id, textures);
    }

    /// Adds a ship model (builder style).
    #[must_use]
    pub fn with_model(self, ship_id: i64, bytes: Vec<u8>) -> Self {
        self.insert_model(ship_id, bytes);
        self
    }

    /// Adds a texture pair (builder style).
    #[must_use]
    pub fn with_textures(self, date_id: i64, top: Vec<u8>, side: Vec<u8>) -> Self {
        self.insert_textures(date_id, TextureBytes::new(top, side));
        self
    }

    /// Removes a ship model.
    pub fn remove_model(&self, ship_id: i64) -> Option<Vec<u8>> {
        self.models.remove(&ship_id).map(|(_, v)| v)
    }
}

#[async_trait]
impl ShipModelRepository for InMemoryRepository {
    async fn find_ship_model_bytes(&self, ship_id: i64) -> TexturingResult<Option<Vec<u8>>> {
        Ok(self.models.get(&ship_id).map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl TextureRepository for InMemoryRepository {
    async fn find_texture_bytes(&self, date_id: i64) -> TexturingResult<Option<TextureBytes>> {
        Ok(self.textures.get(&date_id).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_hits_and_misses() {
        let repo = InMemoryRepository::new()
            .with_model(1, b"ply".to_vec())
            .with_textures(2, b"top".to_vec(), b"side".to_vec());

        assert_eq!(repo.find_ship_model_bytes(1).await.unwrap(), Some(b"ply".to_vec()));
        assert_eq!(repo.find_ship_model_bytes(999).await.unwrap(), None);

        let textures = repo.find_texture_bytes(2).await.unwrap().unwrap();
        assert_eq!(textures.top, b"top");
        assert!(repo.find_texture_bytes(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_model() {
        let repo = InMemoryRepository::new().with_model(1, vec![0]);
        assert!(repo.remove_model(1).is_some());
        assert!(repo.find_ship_model_bytes(1).await.unwrap().is_none());
    }
}
