//! File system utilities for run directories and artifacts.
//!
//! Idempotent directory handling and copies with automatic parent creation.

use crate::bail;
use crate::pipeline::error::{Error, ErrorExt, Result};
use std::{io, path::Path};
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        // Try removal, ignore NotFound (idempotent)
        match fs::remove_dir_all(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(error) => {
                return Err(Error::Fs {
                    context: "removing directory",
                    path: path.to_path_buf(),
                    error,
                });
            }
        }
    }

    // create_dir_all is already idempotent - succeeds even if dir exists
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    if !from.exists() {
        bail!("{from:?} does not exist");
    }
    if !from.is_file() {
        bail!("{from:?} is not a file");
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file to", to)
}

/// Writes `contents` to `path`, creating parent directories first.
pub async fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .fs_context("creating directory", parent)?;
    }
    fs::write(path, contents).await.fs_context("writing", path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn erase_empties_existing_directory() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("run");
        write_file(&dir.join("stale.txt"), "old").await.unwrap();

        create_dir_all(&dir, true).await.unwrap();

        assert!(dir.is_dir());
        assert!(!dir.join("stale.txt").exists());
    }

    #[tokio::test]
    async fn copy_creates_destination_parents() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("a.bin");
        write_file(&src, [1u8, 2, 3]).await.unwrap();

        let copied = copy_file(&src, &temp.path().join("x/y/a.bin")).await.unwrap();

        assert_eq!(copied, 3);
        assert!(temp.path().join("x/y/a.bin").is_file());
    }

    #[tokio::test]
    async fn copy_rejects_directories() {
        let temp = tempfile::tempdir().unwrap();
        let err = copy_file(temp.path(), &temp.path().join("out")).await.unwrap_err();
        assert!(matches!(err, Error::GenericError(ref m) if m.contains("is not a file")));
    }

    #[tokio::test]
    async fn copy_rejects_missing_source() {
        let temp = tempfile::tempdir().unwrap();
        let err = copy_file(&temp.path().join("gone.exe"), &temp.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GenericError(ref m) if m.contains("does not exist")));
    }
}
