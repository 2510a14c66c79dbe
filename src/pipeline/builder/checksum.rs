//! Artifact checksum calculation.
//!
//! SHA256 of a single executable. Recomputed after signing since signing
//! rewrites the file in place.

use crate::pipeline::{Result, error::ErrorExt};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Calculates the SHA256 checksum and size of a file.
///
/// Reads in 8KB chunks to handle large files efficiently.
///
/// # Returns
///
/// * `Ok((String, u64))` - Hex-encoded SHA-256 hash (64 characters) and byte count
/// * `Err` - If the file cannot be read
pub async fn calculate_sha256(file_path: &Path) -> Result<(String, u64)> {
    let mut file = tokio::fs::File::open(file_path)
        .await
        .fs_context("opening file for hashing", file_path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];
    let mut size = 0u64;

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", file_path)?;
        if n == 0 {
            break;
        }
        size += n as u64;
        hasher.update(&buffer[..n]);
    }

    Ok((format!("{:x}", hasher.finalize()), size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_known_content() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("hello.txt");
        tokio::fs::write(&path, b"hello").await.unwrap();

        let (sum, size) = calculate_sha256(&path).await.unwrap();

        assert_eq!(
            sum,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(size, 5);
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let err = calculate_sha256(Path::new("no/such/artifact.exe"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("artifact.exe"));
    }
}
