use std::{path::PathBuf, sync::Arc};

use derive_builder::Builder;
use serde_json::Value;

use crate::{
    fs::{FileSystem, OsFileSystem},
    migration::Migrate,
};

/// Options for opening a [`Store`](crate::Store).
///
/// The record type (the current schema) is chosen by the store's type
/// parameter; everything else is configured here.
///
/// ```rust
/// use next_store::StoreOptions;
/// use serde_json::json;
///
/// let options = StoreOptions::builder()
///     .name("user")
///     .path("./store")
///     .defaults(json!({ "name": "John Doe" }))
///     .build()?;
///
/// assert_eq!(options.file_path(), std::path::Path::new("./store/user.json"));
/// # Ok::<(), next_store::error::Error>(())
/// ```
#[derive(Builder)]
#[builder(
    pattern = "owned",
    build_fn(validate = "Self::validate", error = "StoreOptionsBuilderError")
)]
pub struct StoreOptions {
    /// File name of the store, without the `.json` extension.
    #[builder(setter(into))]
    pub(crate) name: String,

    /// Directory containing the store file.
    #[builder(setter(into), default = "PathBuf::from(\".\")")]
    pub(crate) path: PathBuf,

    /// Overrides for the schema defaults. Must be a JSON object.
    #[builder(setter(into, strip_option), default)]
    pub(crate) defaults: Option<Value>,

    #[builder(setter(custom), default)]
    pub(crate) migrations: Option<Arc<dyn Migrate>>,

    #[builder(setter(custom), default = "Arc::new(OsFileSystem)")]
    pub(crate) fs: Arc<dyn FileSystem>,
}

impl StoreOptions {
    pub fn builder() -> StoreOptionsBuilder {
        StoreOptionsBuilder::default()
    }

    /// The resolved location of the store file: `<path>/<name>.json`.
    pub fn file_path(&self) -> PathBuf {
        self.path.join(format!("{}.json", self.name))
    }
}

impl StoreOptionsBuilder {
    /// Sets the migration applied to existing store files.
    pub fn migrations(mut self, migrate: impl Migrate + 'static) -> Self {
        self.migrations = Some(Some(Arc::new(migrate)));
        self
    }

    /// Replaces the file system the store reads from and writes to.
    pub fn fs(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Some(Arc::new(fs));
        self
    }

    fn validate(&self) -> Result<(), String> {
        match &self.name {
            Some(name) if name.is_empty() => Err("name must not be empty".to_string()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreOptionsBuilderError {
    #[error("missing required option `{0}`")]
    UninitializedField(&'static str),

    #[error("{0}")]
    Validation(String),
}

impl From<derive_builder::UninitializedFieldError> for StoreOptionsBuilderError {
    fn from(err: derive_builder::UninitializedFieldError) -> Self {
        Self::UninitializedField(err.field_name())
    }
}

impl From<String> for StoreOptionsBuilderError {
    fn from(msg: String) -> Self {
        Self::Validation(msg)
    }
}
