//! Literal version discriminant for record types.
//!
//! Every record persisted by a [`Store`](crate::Store) carries a `version`
//! field. Declaring that field as [`Version<N>`] pins it to the literal
//! number `N`: it always serializes as `N`, it only deserializes from `N`,
//! and it defaults to `N` when the field is missing.
//!
//! ```rust
//! use next_store::Version;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! #[serde(default)]
//! struct UserV2 {
//!     version: Version<2>,
//!     email: String,
//! }
//!
//! let user: UserV2 = serde_json::from_value(serde_json::json!({})).unwrap();
//! assert_eq!(user.version.get(), 2);
//!
//! let stale = serde_json::from_value::<UserV2>(serde_json::json!({ "version": 1 }));
//! assert!(stale.is_err());
//! ```
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version<const N: u32>;

impl<const N: u32> Version<N> {
    pub const VALUE: u32 = N;

    pub const fn get(self) -> u32 {
        N
    }
}

impl<const N: u32> fmt::Debug for Version<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version<{N}>")
    }
}

impl<const N: u32> fmt::Display for Version<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{N}")
    }
}

impl<const N: u32> PartialEq<u32> for Version<N> {
    fn eq(&self, other: &u32) -> bool {
        N == *other
    }
}

impl<const N: u32> Serialize for Version<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(N)
    }
}

impl<'de, const N: u32> Deserialize<'de> for Version<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_u64(VersionVisitor::<N>)
    }
}

struct VersionVisitor<const N: u32>;

impl<const N: u32> VersionVisitor<N> {
    fn check<E: de::Error>(found: impl fmt::Display, matches: bool) -> Result<Version<N>, E> {
        if matches {
            Ok(Version)
        } else {
            Err(E::custom(format_args!("expected version {N}, found {found}")))
        }
    }
}

impl<const N: u32> de::Visitor<'_> for VersionVisitor<N> {
    type Value = Version<N>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the version number {N}")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Self::check(v, v == u64::from(N))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Self::check(v, v == i64::from(N))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Self::check(v, v == f64::from(N))
    }
}
