use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cg_core::storage::{ensure_content, ensure_plain_filename};
use cg_core::{DocumentStore, Error, Result, SavedDocument};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::random_filename;

const MAX_NAME_ATTEMPTS: usize = 5;

/// Markdown files on local disk, one file per save.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl DocumentStore for FsStore {
    async fn save_markdown(&self, content: &str) -> Result<SavedDocument> {
        ensure_content(content)?;
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Error::SaveFailure(format!("{}: {}", self.root.display(), e)))?;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let filename = random_filename();
            let path = self.root.join(&filename);
            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(Error::SaveFailure(format!("{}: {}", path.display(), e))),
            };
            file.write_all(content.as_bytes())
                .await
                .map_err(|e| Error::SaveFailure(format!("{}: {}", path.display(), e)))?;
            file.flush()
                .await
                .map_err(|e| Error::SaveFailure(format!("{}: {}", path.display(), e)))?;

            info!("💾 Saved markdown to {}", path.display());
            return Ok(SavedDocument { filename, path });
        }

        Err(Error::SaveFailure("could not pick an unused filename".to_string()))
    }

    fn resolve(&self, filename: &str) -> Result<PathBuf> {
        ensure_plain_filename(filename)?;
        let path = self.root.join(filename.trim());
        if !path.is_file() {
            return Err(Error::NotFound(format!("文件不存在: {}", filename)));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_writes_random_markdown_file() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path().join("medias/docs"));

        let saved = store.save_markdown("---\ntitle: t\n---\n\n# t").await.unwrap();
        assert_eq!(saved.filename.len(), 13);
        assert!(saved.filename.ends_with(".md"));
        assert!(saved.filename[..10].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(std::fs::read_to_string(&saved.path).unwrap(), "---\ntitle: t\n---\n\n# t");
        assert_eq!(store.resolve(&saved.filename).unwrap(), saved.path);
    }

    #[tokio::test]
    async fn test_blank_content_writes_nothing() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("docs");
        let store = FsStore::new(&root);

        let err = store.save_markdown("  ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal_and_unknown_names() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path());
        assert!(matches!(store.resolve("../etc/passwd"), Err(Error::InvalidInput(_))));
        assert!(matches!(store.resolve("missing.md"), Err(Error::NotFound(_))));
    }
}
