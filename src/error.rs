use thiserror::Error;

use crate::options::StoreOptionsBuilderError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The decoded store file is not a JSON object.
    #[error("Invalid store format")]
    InvalidFormat,

    /// The decoded store file has no numeric `version` field.
    ///
    /// This is checked before any migration runs, so supplying a migration
    /// does not help with files that were never versioned.
    #[error("Invalid store version")]
    InvalidVersion,

    /// A value did not conform to the record type.
    ///
    /// The contained error is the serde failure, which names the offending
    /// field where it can.
    #[error("Schema validation: {0}")]
    SchemaValidation(#[source] serde_json::Error),

    /// The value passed to [`Store::set`](crate::Store::set) cannot be merged
    /// into the record.
    #[error("Invalid patch: {0}")]
    InvalidPatch(String),

    /// The `defaults` option is not a JSON object.
    #[error("Invalid defaults: expected a JSON object")]
    InvalidDefaults,

    #[error("Store options: {0}")]
    Options(#[from] StoreOptionsBuilderError),
}

impl Error {
    pub(crate) fn validation(err: serde_json::Error) -> Self {
        Error::SchemaValidation(err)
    }
}
