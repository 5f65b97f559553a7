use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{Gateway, GatewayError, KeyValues, PinMetadata, PinRecord};
use crate::object::{ContentHash, Upload};

/// In-memory gateway keeping pins in insertion order.
///
/// Content hashes are CIDv1 over the uploaded bytes, so uploading the same
/// bytes twice re-pins the existing entry with the new metadata.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    inner: Arc<RwLock<MemoryGatewayInner>>,
}

#[derive(Debug, Default)]
struct MemoryGatewayInner {
    pins: Vec<PinRecord>,
    /// Error message for the next `update_metadata` call, if armed
    fail_next_update: Option<String>,
    updates: usize,
}

impl MemoryGatewayInner {
    fn find_mut(&mut self, hash: &ContentHash) -> Option<&mut PinRecord> {
        self.pins.iter_mut().find(|pin| &pin.hash == hash)
    }

    fn pin(&mut self, hash: ContentHash, metadata: PinMetadata) {
        match self.find_mut(&hash) {
            Some(existing) => existing.metadata = metadata,
            None => self.pins.push(PinRecord { hash, metadata }),
        }
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `bytes` with arbitrary metadata, bypassing the upload path.
    ///
    /// Useful for seeding records the upload path would never write, such
    /// as a corrupt `access` value.
    pub fn insert_pin(
        &self,
        bytes: &[u8],
        metadata: PinMetadata,
    ) -> Result<ContentHash, GatewayError> {
        let hash = ContentHash::of_bytes(bytes).map_err(|e| GatewayError::Internal(e.to_string()))?;
        self.inner.write().pin(hash.clone(), metadata);
        Ok(hash)
    }

    /// Current metadata for a pin, without going through the trait.
    pub fn metadata(&self, hash: &ContentHash) -> Option<PinMetadata> {
        self.inner
            .read()
            .pins
            .iter()
            .find(|pin| &pin.hash == hash)
            .map(|pin| pin.metadata.clone())
    }

    /// Make the next `update_metadata` call fail without writing.
    pub fn fail_next_update(&self, reason: impl Into<String>) {
        self.inner.write().fail_next_update = Some(reason.into());
    }

    /// Number of successful `update_metadata` calls so far.
    pub fn update_count(&self) -> usize {
        self.inner.read().updates
    }

    pub fn len(&self) -> usize {
        self.inner.read().pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().pins.is_empty()
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn upload(
        &self,
        upload: &Upload,
        keyvalues: KeyValues,
    ) -> Result<ContentHash, GatewayError> {
        let hash =
            ContentHash::of_bytes(&upload.bytes).map_err(|e| GatewayError::Upload(e.to_string()))?;
        let metadata = PinMetadata {
            name: Some(upload.name.clone()),
            keyvalues,
        };
        self.inner.write().pin(hash.clone(), metadata);
        Ok(hash)
    }

    async fn get_metadata(&self, hash: &ContentHash) -> Result<PinMetadata, GatewayError> {
        self.metadata(hash)
            .ok_or_else(|| GatewayError::NotFound(hash.clone()))
    }

    async fn update_metadata(
        &self,
        hash: &ContentHash,
        metadata: PinMetadata,
    ) -> Result<(), GatewayError> {
        let mut inner = self.inner.write();
        if let Some(reason) = inner.fail_next_update.take() {
            return Err(GatewayError::Internal(reason));
        }

        let pin = inner
            .find_mut(hash)
            .ok_or_else(|| GatewayError::NotFound(hash.clone()))?;
        pin.metadata = metadata;
        inner.updates += 1;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<PinRecord>, GatewayError> {
        Ok(self.inner.read().pins.clone())
    }
}
