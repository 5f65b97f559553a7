use chrono::{DateTime, Utc};

use common::access::AccessGrant;
use common::object::Object;

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Human-readable size with one decimal, in binary steps up to GB.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, SIZE_UNITS[unit])
}

pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

/// One line per object: hash, name, then date, size and type.
pub fn object_line(object: &Object) -> String {
    let uploaded = object
        .uploaded_at
        .map(format_date)
        .unwrap_or_else(|| "unknown date".to_string());
    format!(
        "{}  {}\n    {} · {} · {}",
        object.content_hash,
        object.display_name,
        uploaded,
        format_size(object.byte_size),
        object.mime_type
    )
}

pub fn access_list(grants: &[AccessGrant], now: DateTime<Utc>) -> String {
    if grants.is_empty() {
        return "No access has been granted yet".to_string();
    }

    grants
        .iter()
        .map(|grant| {
            let marker = if grant.is_expired_at(now) {
                " [expired]"
            } else {
                ""
            };
            format!(
                "{}{}\n    Access Level: {} · Expires: {}",
                grant.grantee_email,
                marker,
                grant.access_level,
                format_date(grant.expires_at)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
