//! Pinning gateway clients
//!
//! Everything we need from a pinning service fits in four calls, captured by
//! the [`Gateway`] trait. Each call is one round trip with no retry and no
//! timeout; none of them touch local state.
//!
//! - [`PinataClient`]: the Pinata HTTP API
//! - [`MemoryGateway`]: an in-process stand-in with the same semantics

mod memory;
mod pinata;

use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};

use crate::object::{ContentHash, Upload};

pub use memory::MemoryGateway;
pub use pinata::{ConfigurationError, PinataClient, PinataConfig, DEFAULT_GATEWAY_URL};

/// Free-form key/value metadata attached to a pin.
pub type KeyValues = serde_json::Map<String, serde_json::Value>;

/// The name and key/values the gateway stores next to a pin.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PinMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable_keyvalues")]
    pub keyvalues: KeyValues,
}

/// One pinned object as reported by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct PinRecord {
    pub hash: ContentHash,
    pub metadata: PinMetadata,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("object not found on gateway: {0}")]
    NotFound(ContentHash),
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
    #[error("gateway error: {0}")]
    Internal(String),
}

#[async_trait]
pub trait Gateway: Send + Sync + Debug + Clone + 'static {
    /// Pin a file together with its metadata.
    ///
    /// Never partially succeeds. Any transport or status failure surfaces
    /// as [`GatewayError::Upload`].
    async fn upload(&self, upload: &Upload, keyvalues: KeyValues)
        -> Result<ContentHash, GatewayError>;

    /// Fetch the metadata of a single pin.
    ///
    /// Fails with [`GatewayError::NotFound`] when the gateway does not know
    /// the hash.
    async fn get_metadata(&self, hash: &ContentHash) -> Result<PinMetadata, GatewayError>;

    /// Replace a pin's name and key/values wholesale.
    ///
    /// There is no partial update and no conditional write: callers
    /// read-modify-write the full set, and two writers racing on the same
    /// pin will lose one of the updates.
    async fn update_metadata(
        &self,
        hash: &ContentHash,
        metadata: PinMetadata,
    ) -> Result<(), GatewayError>;

    /// Every pin visible to our credentials, unfiltered.
    async fn list_all(&self) -> Result<Vec<PinRecord>, GatewayError>;
}

fn nullable_keyvalues<'de, D>(deserializer: D) -> Result<KeyValues, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<KeyValues>::deserialize(deserializer)?.unwrap_or_default())
}
