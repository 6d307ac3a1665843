//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── aggies.csv            # One export per profiled subreddit
//! └── utaustin.csv
//! ```

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::utils::sanitize_filename;

/// Local filesystem storage backend for export files.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Path an export named `filename` lands at, after sanitizing.
    pub fn path(&self, filename: &str) -> Result<PathBuf> {
        let name = sanitize_filename(filename);
        if name.is_empty() || name == "." || name == ".." {
            return Err(AppError::validation(format!(
                "'{filename}' is not a usable file name"
            )));
        }
        Ok(self.root_dir.join(name))
    }

    /// Write bytes atomically (write to temp, then rename).
    pub async fn write_bytes(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(filename)?;
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_bytes_creates_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        let path = storage.write_bytes("aggies.csv", b"Subreddit,Frequency\n").await.unwrap();

        assert_eq!(path, dir.path().join("aggies.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), b"Subreddit,Frequency\n");
        assert!(!dir.path().join("aggies.csv.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_bytes_stays_inside_root() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("out"));

        let path = storage.write_bytes("../escape.csv", b"x").await.unwrap();

        assert_eq!(path, dir.path().join("out").join("..escape.csv"));
        assert!(!dir.path().join("escape.csv").exists());
    }

    #[tokio::test]
    async fn test_write_bytes_overwrites() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write_bytes("a.csv", b"old").await.unwrap();
        storage.write_bytes("a.csv", b"new").await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("a.csv")).unwrap(), b"new");
    }

    #[test]
    fn test_unusable_names_rejected() {
        let storage = LocalStorage::new(".");
        assert!(storage.path("/").is_err());
        assert!(storage.path("..").is_err());
        assert!(storage.path("./").is_err());
    }
}
