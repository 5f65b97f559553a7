use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifetime of the grant an uploader receives on their own file.
pub const OWNER_GRANT_DAYS: u32 = 30;
/// Lifetime of a grant when the caller does not pick an expiry.
pub const DEFAULT_GRANT_DAYS: u32 = 90;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown access level '{0}' (expected 'read' or 'write')")]
pub struct AccessLevelError(String);

/// What a grantee may do with an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// View only.
    Read,
    /// View and comment.
    Write,
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessLevel::Read => write!(f, "read"),
            AccessLevel::Write => write!(f, "write"),
        }
    }
}

impl FromStr for AccessLevel {
    type Err = AccessLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(AccessLevel::Read),
            "write" => Ok(AccessLevel::Write),
            other => Err(AccessLevelError(other.to_string())),
        }
    }
}

/// A single entry in an object's access list.
///
/// Grantees are free text and never checked against an identity system.
/// The same grantee may appear any number of times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    #[serde(rename = "userEmail")]
    pub grantee_email: String,
    #[serde(rename = "accessLevel")]
    pub access_level: AccessLevel,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

impl AccessGrant {
    pub fn new(
        grantee_email: impl Into<String>,
        access_level: AccessLevel,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            grantee_email: grantee_email.into(),
            access_level,
            expires_at,
        }
    }

    /// A grant that expires `days` after `now`, saturating at the latest
    /// representable time.
    pub fn expiring_in(
        grantee_email: impl Into<String>,
        access_level: AccessLevel,
        now: DateTime<Utc>,
        days: u32,
    ) -> Self {
        let expires_at = Duration::try_days(i64::from(days))
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(grantee_email, access_level, expires_at)
    }

    /// The grant an uploader holds on their own file.
    pub fn owner(grantee_email: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::expiring_in(grantee_email, AccessLevel::Write, now, OWNER_GRANT_DAYS)
    }

    /// Expired iff `now` is strictly after `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Case-sensitive exact match on the grantee.
    pub fn is_for(&self, email: &str) -> bool {
        self.grantee_email == email
    }
}
