use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedDocument {
    pub filename: String,
    pub path: PathBuf,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a markdown document under a fresh random name
    async fn save_markdown(&self, content: &str) -> Result<SavedDocument>;

    /// Map a previously returned filename back to its location
    fn resolve(&self, filename: &str) -> Result<PathBuf>;
}

/// Rejects blank documents before anything touches the store.
pub fn ensure_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(Error::InvalidInput("content 不能为空".to_string()));
    }
    Ok(())
}

/// Filenames handed back to clients must stay inside the store.
pub fn ensure_plain_filename(filename: &str) -> Result<()> {
    let trimmed = filename.trim();
    if trimmed.is_empty()
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains("..")
    {
        return Err(Error::InvalidInput(format!("Invalid filename: {}", filename)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_content_is_rejected() {
        assert!(ensure_content("  \n\t").is_err());
        assert!(ensure_content("# title").is_ok());
    }

    #[test]
    fn test_filename_traversal_is_rejected() {
        assert!(ensure_plain_filename("abcDEF1234.md").is_ok());
        assert!(ensure_plain_filename("../secret.md").is_err());
        assert!(ensure_plain_filename("a/b.md").is_err());
        assert!(ensure_plain_filename("").is_err());
    }
}
