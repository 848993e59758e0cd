//! File access for address books.
//!
//! [`FsStorage`] writes through a temporary file in the destination
//! directory, syncs it and renames it over the target, so a crash or a
//! failed write never leaves a truncated book behind.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// Byte-level access to address book files
pub trait BookStorage: Send + Sync {
    /// Reads the whole file
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Reads at most `len` bytes from the start of the file
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read_prefix(&self, path: &Path, len: usize) -> io::Result<Vec<u8>> {
        let mut data = self.read(path)?;
        data.truncate(len);
        Ok(data)
    }

    /// Replaces the file contents atomically
    ///
    /// Either the complete new contents are visible afterwards or the old
    /// file is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Local file system storage
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl BookStorage for FsStorage {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn read_prefix(&self, path: &Path, len: usize) -> io::Result<Vec<u8>> {
        let file = fs::File::open(path)?;
        let mut data = Vec::with_capacity(len);
        file.take(len as u64).read_to_end(&mut data)?;
        Ok(data)
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        atomic_write(path, bytes)
    }
}

/// Writes `bytes` to `path` via a synced temporary file and a rename
///
/// The temporary file is created next to `path` so the rename never crosses
/// file systems. On Unix the file is created with mode 0600.
///
/// # Errors
///
/// Returns the underlying I/O error; the temporary file is removed on
/// failure.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    atomic_write_with(path, |file| file.write_all(bytes))
}

/// [`atomic_write`] with `fill` producing the contents of the temporary file
///
/// The target is only replaced if `fill` succeeds.
pub(crate) fn atomic_write_with(
    path: &Path,
    fill: impl FnOnce(&mut fs::File) -> io::Result<()>,
) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    fill(temp.as_file_mut())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    // Best effort: make the rename itself durable
    #[cfg(unix)]
    {
        if let Ok(dir) = fs::File::open(dir) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}
