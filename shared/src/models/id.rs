//! Canonical identifiers
//!
//! HQ is inconsistent about id types: the same item id can arrive as `100`
//! or `"100"`, while scanned codes are always text. Every id is stored in
//! its canonical string form so equality never depends on the JSON type.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

macro_rules! canonical_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Canonical string form
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                Self(n.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

canonical_id!(
    /// Order identifier
    OrderId
);
canonical_id!(
    /// Order item identifier (what the item barcode encodes)
    ItemId
);
canonical_id!(
    /// Shipment identifier
    ShipmentId
);
canonical_id!(
    /// Shipping box identifier
    BoxId
);
canonical_id!(
    /// Signed-in user identifier
    UserId
);
