use std::fmt;
use std::sync::Arc;

use cg_core::{ChatMessage, GenerationProvider, Result};
use tracing::{debug, warn};

use crate::prompt::chat_system_instruction;

/// Shown to the user instead of the raw error when a turn fails.
pub const CHAT_APOLOGY: &str = "抱歉,连接出现了一点问题。";

/// Shown when the provider answered with no text.
pub const CHAT_EMPTY_REPLY: &str = "无法回答此问题。";

/// A conversation grounded on one article. The transcript only grows, and
/// only by whole turns.
pub struct ChatSession {
    provider: Arc<dyn GenerationProvider>,
    transcript: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(topic: &str, context: &str, provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            provider,
            transcript: vec![ChatMessage::system(chat_system_instruction(topic, context))],
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    /// Sends the transcript plus `text`. Both turns are recorded only once the
    /// provider has answered.
    pub async fn send_message(&mut self, text: &str) -> Result<String> {
        let mut outgoing = Vec::with_capacity(self.transcript.len() + 1);
        outgoing.extend_from_slice(&self.transcript);
        outgoing.push(ChatMessage::user(text));

        debug!(provider = self.provider.name(), turns = outgoing.len(), "sending chat turn");
        let reply = self.provider.complete(&outgoing).await?;

        self.transcript = outgoing;
        self.transcript.push(ChatMessage::model(reply.clone()));
        Ok(reply)
    }

    /// Like `send_message`, but never fails: errors become `CHAT_APOLOGY` and
    /// empty replies become `CHAT_EMPTY_REPLY`. The flag tells whether the
    /// provider call succeeded.
    pub async fn reply(&mut self, text: &str) -> (String, bool) {
        match self.send_message(text).await {
            Ok(reply) if reply.trim().is_empty() => (CHAT_EMPTY_REPLY.to_string(), true),
            Ok(reply) => (reply, true),
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "chat turn failed");
                (CHAT_APOLOGY.to_string(), false)
            }
        }
    }
}

impl fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatSession")
            .field("provider", &self.provider.name())
            .field("turns", &self.transcript.len())
            .finish()
    }
}
