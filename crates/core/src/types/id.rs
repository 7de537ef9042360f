//! Newtype IDs for type-safe entity references.
//!
//! The hosted platform issues uuid identities, so the `define_uuid_id!`
//! macro wraps [`uuid::Uuid`] rather than an integer key. Use it to create
//! ID wrappers that prevent accidentally mixing IDs from different entity
//! types.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a type-safe uuid ID wrapper.
///
/// Creates a newtype wrapper around [`Uuid`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_uuid()`
/// - `Display`, `FromStr`, `From<Uuid>` implementations
///
/// # Example
///
/// ```rust
/// # use townboard_core::define_uuid_id;
/// define_uuid_id!(UserId);
/// define_uuid_id!(BusinessId);
///
/// let user_id = UserId::new(uuid::Uuid::new_v4());
///
/// // UserId and BusinessId are different types, so this won't compile:
/// // let _: BusinessId = user_id;
/// ```
#[macro_export]
macro_rules! define_uuid_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Create a new ID from a uuid value.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Get the underlying uuid value.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Ok(Self(::uuid::Uuid::parse_str(s)?))
            }
        }
    };
}

define_uuid_id!(UserId);
define_uuid_id!(BusinessId);

impl UserId {
    /// The sentinel identity used when a record is created without a
    /// signed-in user (the all-zeros uuid the backend accepts as owner).
    #[must_use]
    pub const fn anonymous() -> Self {
        Self(Uuid::nil())
    }

    /// Whether this is the anonymous sentinel rather than a real identity.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0.is_nil()
    }
}

/// Errors that can occur when parsing an [`ApplicationId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplicationIdError {
    /// The input does not start with the `SE` prefix.
    #[error("application id must start with 'SE'")]
    MissingPrefix,
    /// The part after the prefix is not a number.
    #[error("application id must be 'SE' followed by digits")]
    NotNumeric,
}

/// Human-readable identifier for a sales-executive job application.
///
/// Generated client-side as `SE` followed by a number, and used to key the
/// application row and to namespace its uploaded documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Build an application ID from its numeric suffix.
    #[must_use]
    pub fn from_number(n: u32) -> Self {
        Self(format!("SE{n}"))
    }

    /// Parse an application ID, validating the `SE<digits>` shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is missing or the suffix is not
    /// numeric.
    pub fn parse(s: &str) -> Result<Self, ApplicationIdError> {
        let digits = s
            .strip_prefix("SE")
            .ok_or(ApplicationIdError::MissingPrefix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ApplicationIdError::NotNumeric);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApplicationId {
    type Err = ApplicationIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_round_trip() {
        let raw = Uuid::new_v4();
        let id = UserId::new(raw);
        assert_eq!(id.as_uuid(), raw);
        assert_eq!(id.to_string(), raw.to_string());
        assert_eq!(raw.to_string().parse::<UserId>().unwrap(), id);
    }

    #[test]
    fn test_anonymous_sentinel_is_nil() {
        let anon = UserId::anonymous();
        assert!(anon.is_anonymous());
        assert_eq!(anon.to_string(), "00000000-0000-0000-0000-000000000000");
        assert!(!UserId::new(Uuid::new_v4()).is_anonymous());
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = BusinessId::new(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }

    #[test]
    fn test_application_id_parse() {
        let id = ApplicationId::parse("SE1611").unwrap();
        assert_eq!(id.as_str(), "SE1611");
        assert_eq!(ApplicationId::from_number(1611), id);
    }

    #[test]
    fn test_application_id_rejects_bad_shapes() {
        assert_eq!(
            ApplicationId::parse("1611"),
            Err(ApplicationIdError::MissingPrefix)
        );
        assert_eq!(
            ApplicationId::parse("SE"),
            Err(ApplicationIdError::NotNumeric)
        );
        assert_eq!(
            ApplicationId::parse("SEabc"),
            Err(ApplicationIdError::NotNumeric)
        );
    }
}
