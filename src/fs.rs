//! File access used by [`Store`](crate::Store).
//!
//! Every operation opens, uses and closes the file within the call; nothing
//! is held open between store operations.
use std::{
    io::{self, Write},
    path::Path,
};

use tempfile::Builder;

pub trait FileSystem: Send + Sync {
    /// Reads the whole file as UTF-8. A missing file must be reported as
    /// [`io::ErrorKind::NotFound`].
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Replaces the whole file with `contents`.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// The local file system.
///
/// Writes go to a temporary file next to the destination which is then
/// renamed over it, so readers see either the old or the new contents. An
/// existing file keeps its permissions; a new one is created with the
/// process umask applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut builder = Builder::new();
        let existing = match std::fs::metadata(path) {
            Ok(meta) => Some(meta.permissions()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    builder.permissions(std::fs::Permissions::from_mode(0o666));
                }
                None
            }
            Err(err) => return Err(err),
        };

        let mut tmp = builder.tempfile_in(dir)?;
        if let Some(permissions) = existing {
            tmp.as_file().set_permissions(permissions)?;
        }

        tmp.write_all(contents.as_bytes())?;
        tmp.flush()?;

        tmp.persist(path).map_err(|e| e.error)?;

        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}
