//! Store identifiers.
//!
//! Every document is keyed by a 12-byte id rendered as 24 lowercase hex characters:
//! four bytes of big-endian unix seconds followed by eight random bytes. Ids arriving
//! from clients are checked with [`ObjectId::parse`] before any store access.

use std::fmt::{self, Write};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

pub const OBJECT_ID_LEN: usize = 24;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, sqlx::Type, TS, ToSchema)]
#[sqlx(transparent)]
#[schema(value_type = String, example = "65f1c2a9e4b0a1b2c3d4e5f6")]
pub struct ObjectId(String);

impl ObjectId {
    /// Generates a fresh id. Ids created later sort after earlier ones at second granularity.
    pub fn new() -> Self {
        let seconds = chrono::Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let random = Uuid::new_v4();

        let mut hex = String::with_capacity(OBJECT_ID_LEN);
        for byte in seconds.to_be_bytes().iter().chain(&random.as_bytes()[..8]) {
            let _ = write!(hex, "{byte:02x}");
        }
        Self(hex)
    }

    /// Returns `Some` only for exactly 24 ASCII hex digits. Upper-case input is normalised.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() == OBJECT_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(raw.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn is_valid(raw: &str) -> bool {
        Self::parse(raw).is_some()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ObjectId::parse(&raw)
            .ok_or_else(|| de::Error::invalid_value(de::Unexpected::Str(&raw), &"a 24 character hex id"))
    }
}
