use std::fmt;

use async_trait::async_trait;

use crate::types::ChatMessage;
use crate::Result;

#[async_trait]
pub trait GenerationProvider: Send + Sync + fmt::Debug {
    /// Human readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Sends the whole conversation and returns the first reply's text.
    /// An empty reply is returned as an empty string, not an error.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}
