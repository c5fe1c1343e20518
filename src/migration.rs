//! Migrating store files written by older record versions.
//!
//! A store accepts a single [`Migrate`] implementation. When one is supplied,
//! it receives every non-empty file the store opens, whatever version that
//! file declares, and its output becomes the new state of the store.
//!
//! Two flavours are provided:
//!
//! - any `Fn(Document) -> Document` closure, operating on the raw JSON
//!   object. Its output is persisted as-is and is **not** validated against
//!   the current record type.
//! - [`typed`], which decodes the raw object into a family of prior record
//!   versions (usually an untagged enum discriminated by the `version`
//!   field) and maps it to the current record type.
//!
//! ```rust
//! use next_store::{Record, Version, migration};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Record)]
//! #[serde(default)]
//! struct UserV1 { version: Version<1>, name: String }
//! # impl Default for UserV1 { fn default() -> Self { Self { version: Version, name: String::new() } } }
//!
//! #[derive(Serialize, Deserialize, Record)]
//! #[serde(default)]
//! struct UserV2 { version: Version<2>, email: String }
//! # impl Default for UserV2 { fn default() -> Self { Self { version: Version, email: String::new() } } }
//!
//! #[derive(Deserialize)]
//! #[serde(untagged)]
//! enum AnyUser { V1(UserV1), V2(UserV2) }
//!
//! let migrate = migration::typed(|user: AnyUser| match user {
//!     AnyUser::V1(v1) => UserV2 { version: Version, email: format!("{}@example.com", v1.name) },
//!     AnyUser::V2(v2) => v2,
//! });
//! # let _ = migrate;
//! ```
use std::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    document::{self, Document},
    error::{Error, Result},
};

pub trait Migrate: Send + Sync {
    fn migrate(&self, prior: Document) -> Result<Document>;
}

impl<F> Migrate for F
where
    F: Fn(Document) -> Document + Send + Sync,
{
    fn migrate(&self, prior: Document) -> Result<Document> {
        Ok(self(prior))
    }
}

/// A migration from the prior-version family `P` to the record type `T`.
///
/// Created by [`typed`].
pub struct Typed<P, T, F> {
    f: F,
    _marker: PhantomData<fn(P) -> T>,
}

/// Builds a migration that decodes the stored file into `P` before calling `f`.
///
/// A file that matches none of the shapes in `P` fails with
/// [`Error::SchemaValidation`].
pub fn typed<P, T, F>(f: F) -> Typed<P, T, F>
where
    P: DeserializeOwned,
    T: Serialize,
    F: Fn(P) -> T + Send + Sync,
{
    Typed {
        f,
        _marker: PhantomData,
    }
}

impl<P, T, F> Migrate for Typed<P, T, F>
where
    P: DeserializeOwned,
    T: Serialize,
    F: Fn(P) -> T + Send + Sync,
{
    fn migrate(&self, prior: Document) -> Result<Document> {
        let prior: P = serde_json::from_value(prior.into()).map_err(Error::validation)?;
        document::to_document(&(self.f)(prior))
    }
}
