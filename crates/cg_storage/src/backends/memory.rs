use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use cg_core::storage::{ensure_content, ensure_plain_filename};
use cg_core::{DocumentStore, Error, Result, SavedDocument};

use super::random_filename;

const MEMORY_ROOT: &str = "memory://";

/// Keeps saved documents in a map. Used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, filename: &str) -> Option<String> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(filename)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn save_markdown(&self, content: &str) -> Result<SavedDocument> {
        ensure_content(content)?;
        let mut documents = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        let filename = loop {
            let candidate = random_filename();
            if !documents.contains_key(&candidate) {
                break candidate;
            }
        };
        documents.insert(filename.clone(), content.to_string());
        Ok(SavedDocument {
            path: PathBuf::from(format!("{}{}", MEMORY_ROOT, filename)),
            filename,
        })
    }

    fn resolve(&self, filename: &str) -> Result<PathBuf> {
        ensure_plain_filename(filename)?;
        let filename = filename.trim();
        if self.get(filename).is_none() {
            return Err(Error::NotFound(format!("文件不存在: {}", filename)));
        }
        Ok(PathBuf::from(format!("{}{}", MEMORY_ROOT, filename)))
    }
}
