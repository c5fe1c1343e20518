use serde::{Serialize, de::DeserializeOwned};

use crate::{
    document::{self, Document},
    error::{Error, Result},
};

/// A record type persisted by a [`Store`](crate::Store).
///
/// The serde implementation of the type is its schema: deserializing a JSON
/// value into `Self` validates it, and deserializing an empty object yields
/// the schema defaults. Record types are expected to use
/// `#[serde(default)]` so that missing fields are populated.
///
/// Every record must carry a `version` field holding [`Record::VERSION`],
/// usually declared as [`Version<N>`](crate::Version). The
/// [`#[derive(Record)]`](next_store_macros::Record) macro enforces this. A
/// plain integer `version` field accepts any number, so validation only pins
/// the version when the field is a `Version<N>`.
pub trait Record: Serialize + DeserializeOwned + 'static {
    const VERSION: u32;
}

/// Validates an untyped value against the schema of `T`.
pub(crate) fn parse<T: Record>(document: Document) -> Result<T> {
    serde_json::from_value(document.into()).map_err(Error::validation)
}

/// Produces the default record of `T` with `overrides` applied on top.
///
/// The overrides go through the schema as well, so fields they leave out are
/// taken from the schema defaults and fields they set must still conform.
pub(crate) fn defaults<T: Record>(overrides: Option<Document>) -> Result<Document> {
    let record: T = parse(overrides.unwrap_or_default())?;
    document::to_document(&record)
}
