//! Opaque keyset pagination cursors over `(createdAt, id)` pairs.
//!
//! Encoding is `base64url_nopad(RFC3339Nano(createdAt_UTC) + "|" + uuid)`. The
//! codec is shared by every component that needs to produce or consume a
//! cursor, so both sides of the pagination contract agree on one format.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid cursor")]
pub struct InvalidCursor;

/// A decoded keyset position: the `(createdAt, id)` pair a page boundary
/// was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorKey {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl CursorKey {
    pub fn new(created_at: DateTime<Utc>, id: Uuid) -> Self {
        Self { created_at, id }
    }

    /// Encode this key as an opaque cursor string.
    pub fn encode(&self) -> String {
        let raw = format!(
            "{}|{}",
            self.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            self.id
        );
        URL_SAFE_NO_PAD.encode(raw)
    }

    /// Decode a cursor string produced by [`CursorKey::encode`].
    pub fn decode(cursor: &str) -> Result<Self, InvalidCursor> {
        let raw = URL_SAFE_NO_PAD.decode(cursor).map_err(|_| InvalidCursor)?;
        let raw = String::from_utf8(raw).map_err(|_| InvalidCursor)?;
        let (ts, id) = raw.split_once('|').ok_or(InvalidCursor)?;
        let created_at = DateTime::parse_from_rfc3339(ts)
            .map_err(|_| InvalidCursor)?
            .with_timezone(&Utc);
        let id = Uuid::parse_str(id).map_err(|_| InvalidCursor)?;
        Ok(Self { created_at, id })
    }

    /// True if `(created_at, id)` sorts strictly before `other` under
    /// `(createdAt DESC, id DESC)` ordering — i.e. `other` is a valid
    /// exclusive lower bound for a descending keyset page that this row
    /// would appear after.
    pub fn is_strictly_after(&self, other: &CursorKey) -> bool {
        (self.created_at, self.id) < (other.created_at, other.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key(nanos: u32, id_byte: u8) -> CursorKey {
        let created_at = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(nanos as i64);
        let mut bytes = [0u8; 16];
        bytes[15] = id_byte;
        CursorKey::new(created_at, Uuid::from_bytes(bytes))
    }

    #[test]
    fn round_trips() {
        for i in 0..20u8 {
            let k = key(i as u32 * 137, i);
            let encoded = k.encode();
            let decoded = CursorKey::decode(&encoded).expect("decodes");
            assert_eq!(decoded, k);
        }
    }

    #[test]
    fn rejects_bad_base64() {
        assert!(CursorKey::decode("not!!valid!!base64").is_err());
    }

    #[test]
    fn rejects_missing_separator() {
        let encoded = URL_SAFE_NO_PAD.encode("2026-01-01T00:00:00.000000000Zdeadbeef");
        assert!(CursorKey::decode(&encoded).is_err());
    }

    #[test]
    fn rejects_bad_timestamp() {
        let encoded = URL_SAFE_NO_PAD.encode("not-a-timestamp|0196f1f0-0000-7000-8000-000000000000");
        assert!(CursorKey::decode(&encoded).is_err());
    }

    #[test]
    fn rejects_bad_uuid() {
        let encoded = URL_SAFE_NO_PAD.encode("2026-01-01T00:00:00.000000000Z|not-a-uuid");
        assert!(CursorKey::decode(&encoded).is_err());
    }

    #[test]
    fn tie_break_orders_by_id_when_timestamps_equal() {
        let a = key(0, 1);
        let b = key(0, 2);
        assert!(a.is_strictly_after(&b));
        assert!(!b.is_strictly_after(&a));
    }
}
