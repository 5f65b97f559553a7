//! Pinned objects.
//!
//! An [`Object`] is a file that was uploaded to the pinning gateway. The
//! gateway only knows about a content hash and a bag of key/value metadata;
//! this module is the boundary where that bag is read into typed fields.
//!
//! Keys written at upload time:
//! - `type`: MIME type of the file
//! - `size`: size in bytes
//! - `uploadedAt`: ISO-8601 upload timestamp
//! - `access`: the serialized access list (see [`crate::access::codec`])

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cid::Cid;
use multihash::Multihash;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::access::{codec, AccessCodecError, AccessGrant};
use crate::gateway::{KeyValues, PinRecord};

pub const TYPE_KEY: &str = "type";
pub const SIZE_KEY: &str = "size";
pub const UPLOADED_AT_KEY: &str = "uploadedAt";

/// Used when the gateway holds no `type` for an object.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

const RAW_CODEC: u64 = 0x55;
const SHA2_256_CODE: u64 = 0x12;

#[derive(Debug, thiserror::Error)]
pub enum ContentHashError {
    #[error("invalid content hash '{0}': {1}")]
    Invalid(String, cid::Error),
    #[error("failed to build multihash: {0}")]
    Multihash(#[from] multihash::Error),
}

/// Identifier the gateway assigns to pinned content (a CID string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Wrap a hash exactly as the gateway reported it.
    ///
    /// The gateway is authoritative for its own identifiers, so no
    /// validation happens here. Use [`FromStr`] for user input.
    pub fn from_gateway(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// CIDv1 (raw codec, sha2-256) over `bytes`.
    pub fn of_bytes(bytes: &[u8]) -> Result<Self, ContentHashError> {
        let digest = Sha256::digest(bytes);
        let multihash = Multihash::<64>::wrap(SHA2_256_CODE, &digest)?;
        Ok(Self::from(Cid::new_v1(RAW_CODEC, multihash)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Cid> for ContentHash {
    fn from(cid: Cid) -> Self {
        Self(cid.to_string())
    }
}

impl FromStr for ContentHash {
    type Err = ContentHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Cid::try_from(s).map_err(|e| ContentHashError::Invalid(s.to_string(), e))?;
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file waiting to be pinned.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Key/values stored alongside the file on the gateway.
    pub fn keyvalues(
        &self,
        uploaded_at: DateTime<Utc>,
        access: &[AccessGrant],
    ) -> Result<KeyValues, AccessCodecError> {
        let mut keyvalues = KeyValues::new();
        keyvalues.insert(TYPE_KEY.to_string(), Value::from(self.mime_type.clone()));
        keyvalues.insert(SIZE_KEY.to_string(), Value::from(self.byte_size()));
        keyvalues.insert(
            UPLOADED_AT_KEY.to_string(),
            Value::from(uploaded_at.to_rfc3339()),
        );
        codec::write_keyvalues(&mut keyvalues, access)?;
        Ok(keyvalues)
    }
}

/// A pinned file and its access list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub content_hash: ContentHash,
    pub display_name: String,
    pub mime_type: String,
    pub byte_size: u64,
    /// Absent when the gateway record carries no readable upload time.
    pub uploaded_at: Option<DateTime<Utc>>,
    pub access_list: Vec<AccessGrant>,
}

impl Object {
    /// Read a gateway pin record into an object.
    ///
    /// Only the access list is strict: a malformed `access` value fails the
    /// conversion. The descriptive fields fall back to neutral values.
    pub fn from_pin(pin: PinRecord) -> Result<Self, AccessCodecError> {
        let PinRecord { hash, metadata } = pin;
        let access_list = codec::from_keyvalues(&metadata.keyvalues)?;
        let keyvalues = &metadata.keyvalues;

        let mime_type = keyvalues
            .get(TYPE_KEY)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(FALLBACK_MIME_TYPE)
            .to_string();

        let byte_size = match keyvalues.get(SIZE_KEY) {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        };

        let uploaded_at = keyvalues
            .get(UPLOADED_AT_KEY)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc));

        Ok(Self {
            content_hash: hash,
            display_name: metadata.name.unwrap_or_default(),
            mime_type,
            byte_size,
            uploaded_at,
            access_list,
        })
    }

    /// Whether any grant (expired or not) names `email`.
    pub fn has_grant_for(&self, email: &str) -> bool {
        self.access_list.iter().any(|grant| grant.is_for(email))
    }
}
