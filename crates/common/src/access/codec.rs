//! Access list (de)serialization.
//!
//! The list is stored as a JSON array string under the [`ACCESS_KEY`]
//! metadata key:
//!
//! ```text
//! [{"userEmail":"doc@h.com","accessLevel":"read","expiresAt":"2025-01-01T00:00:00Z"}]
//! ```
//!
//! Every write replaces the whole string; there is no partial update.

use serde_json::Value;

use super::AccessGrant;
use crate::gateway::KeyValues;

pub const ACCESS_KEY: &str = "access";

#[derive(Debug, thiserror::Error)]
pub enum AccessCodecError {
    #[error("malformed access data: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("malformed access data: expected a string under 'access', found {0}")]
    UnexpectedType(&'static str),
    #[error("failed to encode access list: {0}")]
    Encode(#[source] serde_json::Error),
}

pub fn encode(grants: &[AccessGrant]) -> Result<String, AccessCodecError> {
    serde_json::to_string(grants).map_err(AccessCodecError::Encode)
}

/// Empty, blank or missing input is an empty list.
pub fn decode(raw: Option<&str>) -> Result<Vec<AccessGrant>, AccessCodecError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw).map_err(AccessCodecError::Malformed),
    }
}

/// Read the access list out of a metadata bag.
pub fn from_keyvalues(keyvalues: &KeyValues) -> Result<Vec<AccessGrant>, AccessCodecError> {
    match keyvalues.get(ACCESS_KEY) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(raw)) => decode(Some(raw.as_str())),
        Some(other) => Err(AccessCodecError::UnexpectedType(json_type(other))),
    }
}

/// Overwrite the access list in a metadata bag, leaving other keys alone.
pub fn write_keyvalues(
    keyvalues: &mut KeyValues,
    grants: &[AccessGrant],
) -> Result<(), AccessCodecError> {
    keyvalues.insert(ACCESS_KEY.to_string(), Value::String(encode(grants)?));
    Ok(())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::access::AccessLevel;

    fn sample() -> Vec<AccessGrant> {
        vec![
            AccessGrant::new(
                "b@x",
                AccessLevel::Write,
                Utc.with_ymd_and_hms(2030, 5, 1, 8, 30, 0).unwrap(),
            ),
            AccessGrant::new(
                "a@x",
                AccessLevel::Read,
                Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
            ),
            AccessGrant::new(
                "b@x",
                AccessLevel::Read,
                Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            ),
        ]
    }

    #[test]
    fn test_roundtrip_preserves_order() {
        let grants = sample();
        let encoded = encode(&grants).unwrap();
        assert_eq!(decode(Some(encoded.as_str())).unwrap(), grants);
    }

    #[test]
    fn test_empty_list_encodes_to_empty_array() {
        assert_eq!(encode(&[]).unwrap(), "[]");
        assert!(decode(Some("[]")).unwrap().is_empty());
    }

    #[test]
    fn test_decode_empty_and_missing() {
        assert!(decode(None).unwrap().is_empty());
        assert!(decode(Some("")).unwrap().is_empty());
        assert!(decode(Some("   ")).unwrap().is_empty());
    }

    #[test]
    fn test_decode_javascript_timestamps() {
        let raw = r#"[{"userEmail":"doc@h.com","accessLevel":"read","expiresAt":"2025-04-01T00:00:00.000Z"}]"#;
        let grants = decode(Some(raw)).unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(
            grants[0].expires_at,
            Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_decode_malformed() {
        for raw in [
            "{",
            "null",
            r#"{"userEmail":"a@x"}"#,
            r#"[{"userEmail":"a@x","accessLevel":"owner","expiresAt":"2025-01-01T00:00:00Z"}]"#,
            r#"[{"userEmail":"a@x","accessLevel":"read","expiresAt":"tomorrow"}]"#,
        ] {
            assert!(
                matches!(decode(Some(raw)), Err(AccessCodecError::Malformed(_))),
                "expected {raw} to be rejected"
            );
        }
    }

    #[test]
    fn test_from_keyvalues() {
        let mut kv = KeyValues::new();
        assert!(from_keyvalues(&kv).unwrap().is_empty());

        kv.insert(ACCESS_KEY.to_string(), Value::Null);
        assert!(from_keyvalues(&kv).unwrap().is_empty());

        kv.insert(ACCESS_KEY.to_string(), json!(7));
        assert!(matches!(
            from_keyvalues(&kv),
            Err(AccessCodecError::UnexpectedType("a number"))
        ));

        kv.insert(ACCESS_KEY.to_string(), json!(encode(&sample()).unwrap()));
        assert_eq!(from_keyvalues(&kv).unwrap(), sample());
    }

    #[test]
    fn test_write_keyvalues_keeps_other_keys() {
        let mut kv = KeyValues::new();
        kv.insert("type".to_string(), json!("application/pdf"));
        kv.insert(ACCESS_KEY.to_string(), json!("[]"));

        write_keyvalues(&mut kv, &sample()).unwrap();

        assert_eq!(kv.get("type"), Some(&json!("application/pdf")));
        assert_eq!(from_keyvalues(&kv).unwrap(), sample());
    }
}
