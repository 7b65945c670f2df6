//! Atomic file replacement.
//!
//! Every persistent write goes through one of two paths: `write_atomic`
//! for single-file mutations, or a `Stage` when one operation must land
//! several files. Both write to a `.tmp` sibling first and rename into
//! place; rename-within-directory is atomic on POSIX filesystems.

use std::path::{Path, PathBuf};

use crate::StoreError;

/// Mode for private key files (owner read/write only).
pub const MODE_SECRET: u32 = 0o600;

/// Mode for certificates, counters, and the index.
pub const MODE_PUBLIC: u32 = 0o644;

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

fn write_with_mode(path: &Path, bytes: &[u8], mode: u32) -> std::io::Result<()> {
    std::fs::write(path, bytes)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;
    Ok(())
}

/// Rename `tmp` over `dest`, replacing an existing destination.
///
/// On Windows `rename` does not replace; removing the destination first
/// is the closest equivalent and leaves a window where `dest` is absent.
fn rename_over(tmp: &Path, dest: &Path) -> std::io::Result<()> {
    #[cfg(windows)]
    if dest.exists() {
        std::fs::remove_file(dest)?;
    }
    std::fs::rename(tmp, dest)
}

/// Write `bytes` to `path` via a `.tmp` sibling and an atomic rename.
///
/// On any failure the `.tmp` file is removed and the destination is left
/// untouched.
pub fn write_atomic(path: &Path, bytes: &[u8], mode: u32) -> Result<(), StoreError> {
    let tmp = tmp_path(path);
    if let Err(source) = write_with_mode(&tmp, bytes, mode) {
        let _ = std::fs::remove_file(&tmp);
        return Err(StoreError::Write {
            path: path.to_path_buf(),
            source,
        });
    }
    if let Err(source) = rename_over(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(StoreError::Rename {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

/// A multi-file stage-then-commit transaction.
///
/// `write` stages bytes to a `.tmp` sibling of the destination; `commit`
/// renames staged files into place **in insertion order**, so the caller
/// expresses its commit-order contract by the order of `write` calls.
/// Dropping an uncommitted stage removes every staged `.tmp` file.
pub struct Stage {
    staged: Vec<(PathBuf, PathBuf)>, // (tmp, dest)
    committed: bool,
}

impl Stage {
    pub fn new() -> Self {
        Self {
            staged: Vec::new(),
            committed: false,
        }
    }

    /// Stage `bytes` for `dest`. On failure the stage is left consistent
    /// and the caller should drop it, which cleans up all `.tmp` files.
    pub fn write(&mut self, dest: &Path, bytes: &[u8], mode: u32) -> Result<(), StoreError> {
        let tmp = tmp_path(dest);
        match write_with_mode(&tmp, bytes, mode) {
            Ok(()) => {
                self.staged.push((tmp, dest.to_path_buf()));
                Ok(())
            }
            Err(source) => {
                let _ = std::fs::remove_file(&tmp);
                Err(StoreError::Write {
                    path: dest.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Rename every staged file into place, in insertion order.
    ///
    /// If a rename fails, files renamed so far stay in place (the commit
    /// orders are chosen so that this is a benign partial state) and the
    /// remaining `.tmp` files are removed on drop.
    pub fn commit(mut self) -> Result<(), StoreError> {
        while !self.staged.is_empty() {
            let (tmp, dest) = self.staged.remove(0);
            if let Err(source) = rename_over(&tmp, &dest) {
                let _ = std::fs::remove_file(&tmp);
                return Err(StoreError::Rename { path: dest, source });
            }
        }
        self.committed = true;
        Ok(())
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        if !self.committed {
            for (tmp, _) in &self.staged {
                let _ = std::fs::remove_file(tmp);
            }
        }
    }
}
