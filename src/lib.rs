pub mod document;
pub mod error;
pub mod fs;
pub mod migration;
pub mod options;
pub mod record;
pub mod store;
pub mod version;

pub use document::Document;
pub use error::Error;
pub use fs::{FileSystem, OsFileSystem};
pub use migration::Migrate;
pub use options::{StoreOptions, StoreOptionsBuilder};
pub use record::Record;
pub use store::Store;
pub use version::Version;

// re-export macro
pub use next_store_macros::Record;
