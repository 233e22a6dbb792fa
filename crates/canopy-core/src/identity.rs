//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the allocation
//! core. Each identifier is a distinct type — you cannot pass a [`UnitId`]
//! where a [`CropId`] is expected.
//!
//! ## Validation
//!
//! The string-based identifier ([`RfidTag`]) validates format at
//! construction time. UUID-based identifiers ([`ContainerId`], [`UnitId`],
//! [`CropId`], [`SnapshotId`]) are always valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor so that invalid values are
/// rejected at deserialization time — not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Helper macro for UUID-based identifier newtypes. Generates the
/// constructor set shared by every id type plus `Default`, `Display`,
/// and `FromStr`.
macro_rules! uuid_id {
    ($(#[$doc:meta])* $ty:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $ty(Uuid);

        impl $ty {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::from_str(s).map(Self)
            }
        }
    };
}

uuid_id! {
    /// A unique identifier for a farm container (the physical box holding
    /// one nursery zone and one cultivation zone).
    ContainerId
}

uuid_id! {
    /// A unique identifier for a growing unit (tray or panel).
    UnitId
}

uuid_id! {
    /// A unique identifier for a crop occupying a sub-coordinate of a unit.
    CropId
}

uuid_id! {
    /// A unique identifier for a recorded unit snapshot.
    SnapshotId
}

// ---------------------------------------------------------------------------
// String-based identifiers (validated at construction)
// ---------------------------------------------------------------------------

/// An RFID tag bound to a growing unit.
///
/// Tags are opaque to this core — no hardware I/O, no format beyond what is
/// needed to keep the unique index well-behaved. The canonical storage form
/// is uppercase.
///
/// # Validation
///
/// - Must be 1-64 characters after trimming
/// - Must be printable ASCII with no interior whitespace
/// - Stored in uppercase form for consistency
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RfidTag(String);

impl_validating_deserialize!(RfidTag);

impl RfidTag {
    /// Create an RFID tag from a string value, validating format.
    ///
    /// The value is converted to uppercase for storage consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRfidTag`] if the string is empty,
    /// longer than 64 characters, or contains non-printable or whitespace
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let upper = s.trim().to_uppercase();

        if upper.is_empty() || upper.len() > 64 {
            return Err(ValidationError::InvalidRfidTag(s));
        }
        if !upper.chars().all(|c| c.is_ascii_graphic()) {
            return Err(ValidationError::InvalidRfidTag(s));
        }

        Ok(Self(upper))
    }

    /// Access the tag string (uppercase).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RfidTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
