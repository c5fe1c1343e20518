//! The persistent, schema-validated record store.
//!
//! This module provides the [`Store`] type, which owns one JSON file on disk
//! and an in-memory copy of the record it contains.
//!
//! # Example
//!
//! ```rust,no_run
//! use next_store::{Record, Store, StoreOptions, Version};
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Debug, Serialize, Deserialize, Record)]
//! #[serde(default)]
//! struct User {
//!     version: Version<1>,
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Default for User {
//!     fn default() -> Self {
//!         Self { version: Version, name: "Adnan".into(), age: 30 }
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Creates ./store/user.json with the defaults if it does not exist yet
//!     let options = StoreOptions::builder().name("user").path("./store").build()?;
//!     let mut store = Store::<User>::open(options)?;
//!
//!     // Merge fields into the record (persists immediately)
//!     store.set(json!({ "name": "John" }))?;
//!
//!     // Derive the next record from the one on disk
//!     store.update(|user| User { age: user.age + 1, ..user })?;
//!
//!     println!("{:?}", store.get()?);
//!     Ok(())
//! }
//! ```
use std::{
    fmt,
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    Record,
    document::{self, Document, VERSION_KEY},
    error::{Error, Result},
    fs::FileSystem,
    migration::Migrate,
    options::StoreOptions,
    record,
};

/// A record of type `T` persisted to `<path>/<name>.json`.
///
/// The store keeps the last written record in memory. Every mutating call
/// writes the whole record back to disk before returning, so the file and
/// the in-memory copy never diverge through this instance.
///
/// # Lifecycle
///
/// 1. **Open**: [`open`](Store::open) loads the file, migrating or
///    validating it, or creates it from the defaults.
/// 2. **Read**: [`store`](Store::store) or [`get`](Store::get).
/// 3. **Write**: [`set`](Store::set), [`update`](Store::update) or
///    [`reset`](Store::reset).
///
/// There is no locking. Two stores pointed at the same file overwrite each
/// other's changes.
pub struct Store<T: Record> {
    name: String,
    path: PathBuf,
    defaults: Document,
    fs: Arc<dyn FileSystem>,
    data: Document,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Store<T> {
    /// Opens the store described by `options`.
    ///
    /// - A missing or empty file is initialized with the default record.
    /// - Otherwise the file must hold a JSON object with a numeric `version`
    ///   field. If a migration was configured, its output becomes the new
    ///   record without further validation; if not, the file is validated
    ///   against `T`.
    ///
    /// In every case the resulting record is written back to the file.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] when the file exists but cannot be read, or when
    ///   writing it fails
    /// - [`Error::Json`] when the file is not valid JSON
    /// - [`Error::InvalidFormat`] when the JSON is not an object
    /// - [`Error::InvalidVersion`] when `version` is missing or not a number
    /// - [`Error::SchemaValidation`] when the file or the defaults do not
    ///   conform to `T`
    pub fn open(options: StoreOptions) -> Result<Self> {
        let path = options.file_path();
        let overrides = options
            .defaults
            .map(|value| document::from_value(value).map_err(|_| Error::InvalidDefaults))
            .transpose()?;
        let defaults = record::defaults::<T>(overrides)?;

        let mut store = Self {
            name: options.name,
            path,
            defaults,
            fs: options.fs,
            data: Document::new(),
            _record: PhantomData,
        };

        let data = match store.fs.read(&store.path) {
            Ok(raw) if raw.is_empty() => {
                warn!(path = %store.path.display(), "store file is empty, using defaults");
                store.defaults.clone()
            }
            Ok(raw) => store.migrate_or_parse(&raw, options.migrations.as_deref())?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %store.path.display(), "creating store file with defaults");
                store.defaults.clone()
            }
            Err(err) => return Err(err.into()),
        };

        store.persist(data)?;
        Ok(store)
    }

    fn migrate_or_parse(&self, raw: &str, migrations: Option<&dyn Migrate>) -> Result<Document> {
        let prior = document::from_value(document::decode(raw)?)?;
        let Some(version) = document::version_of(&prior) else {
            return Err(Error::InvalidVersion);
        };

        match migrations {
            Some(migrate) => {
                info!(
                    path = %self.path.display(),
                    from = %version,
                    to = T::VERSION,
                    "migrating store file"
                );
                migrate.migrate(prior)
            }
            None => {
                let current: T = record::parse(prior)?;
                document::to_document(&current)
            }
        }
    }

    /// Returns a copy of the current record.
    ///
    /// The copy is untyped because the record is only guaranteed to match
    /// `T` when it was validated; see [`get`](Store::get).
    pub fn store(&self) -> Document {
        self.data.clone()
    }

    /// Returns the current record as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaValidation`] if the record was produced by an
    /// unvalidated path (a migration or [`set`](Store::set)) and does not
    /// conform to `T`.
    pub fn get(&self) -> Result<T> {
        record::parse(self.data.clone())
    }

    /// Merges `patch` into the current record and persists it.
    ///
    /// `patch` must serialize to a JSON object. Its top-level fields replace
    /// those of the current record; nested values are not merged. The
    /// `version` field cannot be patched.
    ///
    /// The merged record is not validated against `T`. Fields serialized as
    /// `null` are written as `null`, so patch structs with `Option` fields
    /// should skip the unset ones.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// store.set(json!({ "name": "John" }))?;
    ///
    /// #[derive(Serialize)]
    /// struct UserPatch {
    ///     #[serde(skip_serializing_if = "Option::is_none")]
    ///     name: Option<String>,
    ///     #[serde(skip_serializing_if = "Option::is_none")]
    ///     age: Option<u32>,
    /// }
    ///
    /// store.set(UserPatch { name: None, age: Some(5) })?;
    /// ```
    pub fn set<P: Serialize>(&mut self, patch: P) -> Result<()> {
        let patch = match serde_json::to_value(patch)? {
            Value::Object(map) => map,
            other => {
                return Err(Error::InvalidPatch(format!(
                    "expected a JSON object, found {}",
                    kind_of(&other)
                )));
            }
        };
        if patch.contains_key(VERSION_KEY) {
            return Err(Error::InvalidPatch(format!(
                "the `{VERSION_KEY}` field cannot be set"
            )));
        }

        let mut next = self.store();
        next.extend(patch);
        self.persist(next)
    }

    /// Replaces the record with the result of `f` and persists it.
    ///
    /// The record passed to `f` is read back from the file and validated
    /// against `T`, not taken from memory.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file cannot be read, for instance because it
    ///   was removed since the store was opened
    /// - [`Error::Json`] or [`Error::SchemaValidation`] if its contents are
    ///   not a valid `T`
    pub fn update<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(T) -> T,
    {
        let raw = self.fs.read(&self.path)?;
        debug!(path = %self.path.display(), bytes = raw.len(), "read store file");

        let current: T =
            serde_json::from_value(document::decode(&raw)?).map_err(Error::validation)?;
        let next = document::to_document(&f(current))?;
        self.persist(next)
    }

    /// Restores the defaults computed when the store was opened.
    pub fn reset(&mut self) -> Result<()> {
        self.persist(self.defaults.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn defaults(&self) -> &Document {
        &self.defaults
    }

    fn persist(&mut self, data: Document) -> Result<()> {
        let contents = document::encode(&data)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs.create_dir_all(parent)?;
        }
        self.fs.write(&self.path, &contents)?;
        debug!(path = %self.path.display(), bytes = contents.len(), "wrote store file");

        self.data = data;
        Ok(())
    }
}

impl<T: Record> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
